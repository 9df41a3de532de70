/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Ascon Emulator Peripheral library.

--*/

mod ascon_core;

pub use ascon_core::{AsconCore, AsconCoreArgs};
