//! End-to-end tests of the EcoNFT client, run against an in-process devnet.
#![cfg(test)]

/// Submit a write call and wait for its receipt.
macro_rules! send {
    ($e:expr) => {
        async { $e.await?.watch().await }.await
    };
}

mod context;
mod econft;
mod pending;
mod receiver;
