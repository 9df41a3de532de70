/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Ascon Emulator Types library.

--*/

/// APB data width
pub type ApbData = u32;

/// APB address width
pub type ApbAddr = u32;
