//! Dry-run deployer.
//!
//! Mints pseudo-random contract addresses and transaction hashes from a
//! seed. The same seed and plan always produce the same addresses.

use crate::config::ContractPlan;
use crate::orchestrator::{DeployError, Deployer};
use crate::registry::ContractInstance;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SimulatedDeployer {
    rng: StdRng,
}

impl SimulatedDeployer {
    pub fn new(seed: u64) -> Self {
        SimulatedDeployer {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn random_hex(&mut self, bytes: usize) -> String {
        let mut out = String::with_capacity(2 + bytes * 2);
        out.push_str("0x");
        for _ in 0..bytes {
            out.push_str(&format!("{:02x}", self.rng.gen::<u8>()));
        }
        out
    }
}

impl Deployer for SimulatedDeployer {
    fn deploy(&mut self, contract: &ContractPlan, args: &[String]) -> Result<ContractInstance, DeployError> {
        let address = self.random_hex(20);
        let transaction_hash = self.random_hex(32);
        debug!("Simulated {}({:?}) at {}", contract.name, args, address);
        Ok(ContractInstance {
            address: Some(address),
            transaction_hash: Some(transaction_hash),
        })
    }
}
