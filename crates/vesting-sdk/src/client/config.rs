use std::time::Duration;

use anchor_lang::prelude::*;

use crate::{
    state::{AccountAddress, Address, Chain},
    utils::{
        constants::programs::{
            APTOS_MODULE_MAINNET, APTOS_MODULE_TESTNET, DISTRIBUTOR_PROGRAM, FEE_ORACLE, REWARD_POOL_PROGRAM_DEVNET,
            REWARD_POOL_PROGRAM_MAINNET, STREAM_PROGRAM_DEVNET, STREAM_PROGRAM_MAINNET, TREASURY,
        },
        errors::{SdkError, SdkResult},
        program_errors::ErrorParser,
        unlock_math::PauseAccounting,
    },
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cluster {
    #[default]
    Mainnet,
    Devnet,
    Testnet,
    Local,
}

/// Client settings. Everything left `None` takes the per-chain, per-cluster default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub chain: Chain,
    pub cluster: Cluster,
    /// Stream program id (Solana) or module publisher address (Aptos).
    pub program_id: Option<Address>,
    pub pause_accounting: Option<PauseAccounting>,
    /// Upper bound on one submit-and-confirm inside a batch.
    pub submit_timeout: Option<Duration>,
    pub fee_oracle: Option<Pubkey>,
}

impl ClientConfig {
    pub fn new(chain: Chain, cluster: Cluster) -> Self {
        Self { chain, cluster, program_id: None, pause_accounting: None, submit_timeout: None, fee_oracle: None }
    }

    pub fn with_program_id(mut self, program_id: Address) -> Self {
        self.program_id = Some(program_id);
        self
    }

    pub fn with_pause_accounting(mut self, pause_accounting: PauseAccounting) -> Self {
        self.pause_accounting = Some(pause_accounting);
        self
    }

    pub fn with_submit_timeout(mut self, submit_timeout: Duration) -> Self {
        self.submit_timeout = Some(submit_timeout);
        self
    }

    /// The stream program, checked to be an address of the configured chain.
    pub fn program_id(&self) -> SdkResult<Address> {
        let program_id = match self.program_id {
            Some(program_id) => program_id,
            None => self.default_program_id()?,
        };

        if program_id.chain() != self.chain {
            return Err(SdkError::invalid(format!("program {program_id} is not a {:?} address", self.chain)));
        }

        Ok(program_id)
    }

    fn default_program_id(&self) -> SdkResult<Address> {
        let program_id = match (self.chain, self.cluster) {
            (Chain::Solana, Cluster::Mainnet) => Address::Solana(STREAM_PROGRAM_MAINNET),
            (Chain::Solana, _) => Address::Solana(STREAM_PROGRAM_DEVNET),
            (Chain::Aptos, Cluster::Mainnet) => Address::Aptos(APTOS_MODULE_MAINNET.parse::<AccountAddress>()?),
            (Chain::Aptos, _) => Address::Aptos(APTOS_MODULE_TESTNET.parse::<AccountAddress>()?),
        };

        Ok(program_id)
    }

    /// Solana stores raw schedule timestamps and lets readers subtract pauses; the Aptos module shifts the schedule
    /// on resume.
    pub fn pause_accounting(&self) -> PauseAccounting {
        self.pause_accounting.unwrap_or(match self.chain {
            Chain::Solana => PauseAccounting::Subtract,
            Chain::Aptos => PauseAccounting::PreSubtracted,
        })
    }

    pub fn fee_oracle(&self) -> Pubkey {
        self.fee_oracle.unwrap_or(FEE_ORACLE)
    }

    pub fn treasury(&self) -> Pubkey {
        TREASURY
    }

    pub fn distributor_program(&self) -> Pubkey {
        DISTRIBUTOR_PROGRAM
    }

    pub fn reward_pool_program(&self) -> Pubkey {
        match self.cluster {
            Cluster::Mainnet => REWARD_POOL_PROGRAM_MAINNET,
            _ => REWARD_POOL_PROGRAM_DEVNET,
        }
    }

    pub fn error_parser(&self) -> SdkResult<ErrorParser> {
        let parser = match self.program_id()? {
            Address::Solana(stream_program) => {
                ErrorParser::Solana { stream_program, distributor_program: self.distributor_program() }
            }
            Address::Aptos(module_address) => ErrorParser::Aptos { module_address: module_address.to_string() },
        };

        Ok(parser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_chain_and_cluster() {
        let config = ClientConfig::new(Chain::Solana, Cluster::Devnet);
        assert_eq!(config.program_id().unwrap(), Address::Solana(STREAM_PROGRAM_DEVNET));
        assert_eq!(config.pause_accounting(), PauseAccounting::Subtract);

        let config = ClientConfig::new(Chain::Aptos, Cluster::Mainnet);
        assert_eq!(config.program_id().unwrap().to_string(), APTOS_MODULE_MAINNET);
        assert_eq!(config.pause_accounting(), PauseAccounting::PreSubtracted);
    }

    #[test]
    fn overrides_win() {
        let program = Pubkey::new_unique();
        let config = ClientConfig::new(Chain::Solana, Cluster::Local)
            .with_program_id(Address::Solana(program))
            .with_pause_accounting(PauseAccounting::PreSubtracted);
        assert_eq!(config.program_id().unwrap(), Address::Solana(program));
        assert_eq!(config.pause_accounting(), PauseAccounting::PreSubtracted);
    }

    #[test]
    fn program_on_wrong_chain_is_rejected() {
        let config = ClientConfig::new(Chain::Aptos, Cluster::Testnet).with_program_id(Address::Solana(Pubkey::new_unique()));
        assert!(matches!(config.program_id(), Err(SdkError::InvalidParameter(_))));
    }
}
