/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Ascon verification library: KAT vector
    parsing, differential scoreboards and stimulus generation.

--*/

mod error;
mod kat;
mod scoreboard;
mod stimulus;

pub use error::VerifyError;
pub use kat::KatVector;
pub use scoreboard::{ResultScoreboard, RoundScoreboard, RoundTap};
pub use stimulus::OpGenerator;
