use std::{collections::HashSet, sync::Arc};

use anchor_lang::{prelude::*, solana_program::instruction::Instruction};
use anchor_spl::{token, token_2022};
use vesting_common::{calculate_total_amount_to_deposit, checked_sum, current_unix_time};

use crate::{
    batch::{execute_batch, BatchItem, BatchOptions, BatchPlan, BatchResult, DispatchMode},
    client::{
        config::ClientConfig,
        params::{
            CancelParams, CreateMultipleParams, CreateResult, CreateStreamParams, GetAllParams, MetadataSource,
            PauseParams, RecipientSpec, StreamDirection, StreamTemplate, TopupParams, TransferParams, UpdateParams,
            WithdrawParams,
        },
        StreamClient,
    },
    codec::{decode_record, encode_text, layout::contract_filter, AccountRecord},
    instructions::{self, *},
    state::{Address, ClaimStatus, Contract, FeeTable, MerkleDistributor, RewardPool, Stream},
    transport::{ChainPayload, SubmitRequest, TransactionId, Transport},
    utils::{
        constants::{misc::WITHDRAW_ALL, programs::NATIVE_MINT},
        errors::{SdkError, SdkResult},
        pda::{
            find_associated_token_address, find_claim_status_address, find_escrow_address, find_metadata_address,
            find_reward_entry_address, find_withdrawor_address,
        },
        program_errors::ErrorParser,
        validations::{
            check_cancel, check_claim, check_clawback, check_create, check_open, check_pause, check_topup,
            check_transfer,
        },
    },
};

/// Client for the Solana stream program.
#[derive(Clone)]
pub struct SolanaStreamClient {
    config: ClientConfig,
    program_id: Pubkey,
    transport: Arc<dyn Transport>,
    parser: ErrorParser,
}

impl SolanaStreamClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> SdkResult<Self> {
        let program_id = config.program_id()?.as_solana()?;
        let parser = config.error_parser()?;

        Ok(Self { config, program_id, transport, parser })
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    // -------------------------------------------------------------------------- //
    //                                  ACCOUNTS                                  //
    // -------------------------------------------------------------------------- //

    async fn fetch<T: AccountRecord>(&self, address: &Pubkey) -> SdkResult<T> {
        let data = self
            .transport
            .get_account(&Address::Solana(*address))
            .await?
            .ok_or_else(|| SdkError::AccountNotFound(address.to_string()))?;

        decode_record(&data)
    }

    /// The fee table of the oracle. A missing oracle account means no partner has custom fees.
    pub async fn fee_table(&self) -> SdkResult<FeeTable> {
        let oracle = Address::Solana(self.config.fee_oracle());
        match self.transport.get_account(&oracle).await? {
            Some(data) => decode_record(&data),
            None => Ok(FeeTable::default()),
        }
    }

    pub async fn contract(&self, id: &Pubkey) -> SdkResult<Contract> {
        self.fetch(id).await
    }

    pub async fn distributor(&self, distributor: &Pubkey) -> SdkResult<MerkleDistributor> {
        self.fetch(distributor).await
    }

    pub async fn claim_status(&self, distributor: &Pubkey, claimant: &Pubkey) -> SdkResult<ClaimStatus> {
        let address = find_claim_status_address(&self.config.distributor_program(), claimant, distributor);
        self.fetch(&address).await
    }

    pub async fn reward_pool(&self, reward_pool: &Pubkey) -> SdkResult<RewardPool> {
        self.fetch(reward_pool).await
    }

    async fn stream(&self, id: &Address) -> SdkResult<(Pubkey, Contract, Stream)> {
        let id = id.as_solana()?;
        let contract = self.contract(&id).await?;
        let stream = contract.to_stream(id, self.config.pause_accounting());

        Ok((id, contract, stream))
    }

    async fn send(&self, instructions: Vec<Instruction>, signers: Vec<Pubkey>) -> SdkResult<TransactionId> {
        let reference = self.transport.prepare().await?;
        let request = SubmitRequest { payload: ChainPayload::Solana { instructions, signers }, reference };

        Ok(self.transport.submit_and_confirm(request).await?)
    }

    // -------------------------------------------------------------------------- //
    //                                  BUILDERS                                  //
    // -------------------------------------------------------------------------- //

    /// Gross amount the sender pays for a net deposit of `net_amount` through `partner`.
    fn gross_amount(fee_table: &FeeTable, partner: Option<&Pubkey>, net_amount: u64) -> SdkResult<u64> {
        let total_fee = fee_table.fees_for(partner).total()?;
        Ok(calculate_total_amount_to_deposit(net_amount, total_fee)?)
    }

    fn create_instruction(
        &self,
        template: &StreamTemplate,
        grant: &RecipientSpec,
        metadata: Pubkey,
        metadata_is_signer: bool,
    ) -> SdkResult<Instruction> {
        check_create(template, grant)?;

        let sender = template.sender.as_solana()?;
        let recipient = grant.recipient.as_solana()?;
        let mint = parse_mint(&template.token_id)?;
        let token_program = template.token_program.map(|program| program.as_solana()).transpose()?.unwrap_or(token::ID);
        let treasury = self.config.treasury();
        let partner = template.partner.map(|partner| partner.as_solana()).transpose()?.unwrap_or(treasury);

        let accounts = CreateAccounts {
            sender,
            sender_tokens: find_associated_token_address(&sender, &mint, &token_program),
            recipient,
            metadata,
            metadata_is_signer,
            escrow_tokens: find_escrow_address(&self.program_id, &metadata),
            recipient_tokens: find_associated_token_address(&recipient, &mint, &token_program),
            treasury,
            treasury_tokens: find_associated_token_address(&treasury, &mint, &token_program),
            withdrawor: find_withdrawor_address(&self.program_id),
            partner,
            partner_tokens: find_associated_token_address(&partner, &mint, &token_program),
            mint,
            fee_oracle: self.config.fee_oracle(),
            stream_program: self.program_id,
            token_program,
        };

        let args = CreateArgs {
            start_time: template.start,
            net_amount_deposited: grant.amount,
            period: template.period,
            amount_per_period: grant.amount_per_period,
            cliff: template.effective_cliff(),
            cliff_amount: grant.cliff_amount,
            cancelable_by_sender: template.cancelable_by_sender,
            cancelable_by_recipient: template.cancelable_by_recipient,
            automatic_withdrawal: template.automatic_withdrawal,
            transferable_by_sender: template.transferable_by_sender,
            transferable_by_recipient: template.transferable_by_recipient,
            can_topup: template.can_topup,
            stream_name: encode_text("stream name", &grant.name)?,
            // Without automatic withdrawals the program expects the period here
            withdraw_frequency: if template.automatic_withdrawal { template.withdrawal_frequency } else { template.period },
            pausable: template.pausable,
            can_update_rate: template.can_update_rate,
        };

        instructions::create(&accounts, &args)
    }

    fn metadata_of(&self, source: MetadataSource, sender: &Pubkey) -> SdkResult<(Pubkey, bool)> {
        match source {
            MetadataSource::Ephemeral(address) => Ok((address.as_solana()?, true)),
            MetadataSource::Derived { nonce } => Ok((find_metadata_address(&self.program_id, sender, nonce), false)),
        }
    }

    // -------------------------------------------------------------------------- //
    //                                DISTRIBUTOR                                 //
    // -------------------------------------------------------------------------- //

    /// Opens the claim of `claimant` in `distributor`, creating the claimant's token account when needed.
    pub async fn claim(
        &self,
        distributor: &Pubkey,
        claimant: &Pubkey,
        amount_unlocked: u64,
        amount_locked: u64,
        proof: Vec<[u8; 32]>,
    ) -> SdkResult<TransactionId> {
        let state = self.distributor(distributor).await?;
        check_claim(&state, claimant, amount_unlocked, amount_locked, &proof, current_unix_time())?;

        let accounts = self.claim_accounts(distributor, &state, claimant);
        let args = NewClaimArgs { amount_unlocked, amount_locked, proof };
        let instructions = vec![
            create_associated_token_account_idempotent(claimant, claimant, &state.mint, &accounts.token_program),
            new_claim(self.config.distributor_program(), &accounts, &args)?,
        ];

        self.send(instructions, vec![]).await
    }

    /// Claims the part of the locked allocation unlocked so far.
    pub async fn claim_locked(&self, distributor: &Pubkey, claimant: &Pubkey) -> SdkResult<TransactionId> {
        let state = self.distributor(distributor).await?;
        let status = self.claim_status(distributor, claimant).await?;

        // Check: something unlocked since the last claim
        if status.claimable_locked(&state, current_unix_time()) == 0 {
            return Err(SdkError::invalid("nothing to claim from the locked allocation"));
        }

        let accounts = self.claim_accounts(distributor, &state, claimant);
        let ix = instructions::claim_locked(self.config.distributor_program(), &accounts)?;

        self.send(vec![ix], vec![]).await
    }

    /// Closes a fully claimed claim status and returns its rent to the claimant.
    pub async fn close_claim(&self, distributor: &Pubkey, claimant: &Pubkey) -> SdkResult<TransactionId> {
        let state = self.distributor(distributor).await?;

        // Check: the distributor lets claims be closed
        if !state.claims_closable {
            return Err(SdkError::invalid("claims of this distributor can't be closed"));
        }

        let program_id = self.config.distributor_program();
        let accounts = CloseClaimAccounts {
            distributor: *distributor,
            claim_status: find_claim_status_address(&program_id, claimant, distributor),
            claimant: *claimant,
        };
        let args = CloseClaimArgs { amount_unlocked: None, amount_locked: None, proof: None };
        let ix = instructions::close_claim(program_id, &accounts, &args)?;

        self.send(vec![ix], vec![]).await
    }

    /// Returns the unclaimed tokens to the clawback receiver.
    pub async fn clawback(&self, distributor: &Pubkey, admin: &Pubkey) -> SdkResult<TransactionId> {
        let state = self.distributor(distributor).await?;
        check_clawback(&state, current_unix_time())?;

        // Check: only the admin claws back
        if state.admin != *admin {
            return Err(SdkError::invalid(format!("{admin} is not the distributor admin")));
        }

        let token_program = token_program_of(distributor, &state.mint, &state.token_vault);
        let accounts = ClawbackAccounts {
            distributor: *distributor,
            from: state.token_vault,
            to: state.clawback_receiver,
            admin: *admin,
            mint: state.mint,
            token_program,
        };
        let ix = instructions::clawback(self.config.distributor_program(), &accounts)?;

        self.send(vec![ix], vec![]).await
    }

    fn claim_accounts(&self, distributor: &Pubkey, state: &MerkleDistributor, claimant: &Pubkey) -> ClaimAccounts {
        let token_program = token_program_of(distributor, &state.mint, &state.token_vault);

        ClaimAccounts {
            distributor: *distributor,
            claim_status: find_claim_status_address(&self.config.distributor_program(), claimant, distributor),
            from: state.token_vault,
            to: find_associated_token_address(claimant, &state.mint, &token_program),
            claimant: *claimant,
            mint: state.mint,
            token_program,
        }
    }

    // -------------------------------------------------------------------------- //
    //                                REWARD POOL                                 //
    // -------------------------------------------------------------------------- //

    /// Claims the rewards accrued by `stake_entry` in `reward_pool`.
    pub async fn claim_rewards(
        &self,
        reward_pool: &Pubkey,
        stake_entry: &Pubkey,
        claimant: &Pubkey,
    ) -> SdkResult<TransactionId> {
        let pool = self.reward_pool(reward_pool).await?;
        let program_id = self.config.reward_pool_program();
        let token_program = token_program_of(reward_pool, &pool.mint, &pool.vault);

        let accounts = ClaimRewardsAccounts {
            reward_pool: *reward_pool,
            stake_entry: *stake_entry,
            reward_entry: find_reward_entry_address(&program_id, reward_pool, stake_entry),
            vault: pool.vault,
            to: find_associated_token_address(claimant, &pool.mint, &token_program),
            claimant: *claimant,
            mint: pool.mint,
            token_program,
        };
        let instructions = vec![
            create_associated_token_account_idempotent(claimant, claimant, &pool.mint, &token_program),
            instructions::claim_rewards(program_id, &accounts)?,
        ];

        self.send(instructions, vec![]).await
    }
}

impl StreamClient for SolanaStreamClient {
    async fn create(&self, params: CreateStreamParams) -> SdkResult<CreateResult> {
        let CreateStreamParams { template, recipient, metadata } = params;
        let sender = template.sender.as_solana()?;
        let (metadata, metadata_is_signer) = self.metadata_of(metadata, &sender)?;

        let create_ix = self.create_instruction(&template, &recipient, metadata, metadata_is_signer)?;

        let mut instructions = Vec::with_capacity(4);
        if template.is_native {
            let partner = template.partner.map(|partner| partner.as_solana()).transpose()?;
            let fee_table = self.fee_table().await?;
            let gross_amount = Self::gross_amount(&fee_table, partner.as_ref(), recipient.amount)?;
            instructions.extend(wrap_native(&sender, gross_amount));
        }
        instructions.push(create_ix);

        let signers = if metadata_is_signer { vec![metadata] } else { vec![] };
        let tx = self.send(instructions, signers).await?;

        Ok(CreateResult { tx, metadata: Address::Solana(metadata) })
    }

    async fn create_multiple(&self, params: CreateMultipleParams) -> SdkResult<BatchResult> {
        let CreateMultipleParams { template, recipients, ephemeral_keys, base_nonce } = params;
        let sender = template.sender.as_solana()?;

        // Check: one ephemeral key per recipient
        if let Some(keys) = &ephemeral_keys {
            if keys.len() != recipients.len() {
                return Err(SdkError::invalid(format!(
                    "{} ephemeral keys for {} recipients",
                    keys.len(),
                    recipients.len()
                )));
            }
        }

        let mut items = Vec::with_capacity(recipients.len());
        for (index, grant) in recipients.iter().enumerate() {
            let source = match &ephemeral_keys {
                Some(keys) => MetadataSource::Ephemeral(keys[index]),
                None => {
                    let nonce = base_nonce.checked_add(index as u64).ok_or(SdkError::ArithmeticOverflow)?;
                    MetadataSource::Derived { nonce }
                }
            };
            let (metadata, metadata_is_signer) = self.metadata_of(source, &sender)?;
            let ix = self.create_instruction(&template, grant, metadata, metadata_is_signer)?;
            let signers = if metadata_is_signer { vec![metadata] } else { vec![] };

            items.push(BatchItem::new(
                grant.recipient,
                Address::Solana(metadata),
                ChainPayload::Solana { instructions: vec![ix], signers },
            ));
        }

        let wrap = if template.is_native {
            let partner = template.partner.map(|partner| partner.as_solana()).transpose()?;
            let fee_table = self.fee_table().await?;
            let gross_amounts = recipients
                .iter()
                .map(|grant| Self::gross_amount(&fee_table, partner.as_ref(), grant.amount))
                .collect::<SdkResult<Vec<u64>>>()?;
            let total = checked_sum(gross_amounts)?;
            Some(ChainPayload::Solana { instructions: wrap_native(&sender, total), signers: vec![] })
        } else {
            None
        };

        let plan = BatchPlan { wrap, items, mode: DispatchMode::for_batch(ephemeral_keys.is_some()) };
        let options = BatchOptions { submit_timeout: self.config.submit_timeout, ..Default::default() };

        execute_batch(Arc::clone(&self.transport), plan, &self.parser, options).await
    }

    async fn withdraw(&self, params: WithdrawParams) -> SdkResult<TransactionId> {
        let (id, contract, stream) = self.stream(&params.id).await?;
        check_open(&stream)?;

        // Check: an explicit amount fits in what is left
        if params.amount != WITHDRAW_ALL && params.amount > stream.remaining() {
            return Err(SdkError::invalid(format!(
                "withdraw amount {} exceeds the remaining {}",
                params.amount,
                stream.remaining()
            )));
        }

        let accounts = WithdrawAccounts {
            authority: params.invoker.as_solana()?,
            recipient: contract.recipient,
            recipient_tokens: contract.recipient_tokens,
            metadata: id,
            escrow_tokens: contract.escrow_tokens,
            treasury: contract.treasury,
            treasury_tokens: contract.treasury_tokens,
            partner: contract.partner,
            partner_tokens: contract.partner_tokens,
            mint: contract.mint,
            token_program: contract_token_program(&contract),
        };
        let ix = instructions::withdraw(self.program_id, &accounts, &WithdrawArgs { amount: params.amount })?;

        self.send(vec![ix], vec![]).await
    }

    async fn cancel(&self, params: CancelParams) -> SdkResult<TransactionId> {
        let (id, contract, stream) = self.stream(&params.id).await?;
        check_cancel(&stream, &params.invoker)?;

        let accounts = CancelAccounts {
            authority: params.invoker.as_solana()?,
            sender: contract.sender,
            sender_tokens: contract.sender_tokens,
            recipient: contract.recipient,
            recipient_tokens: contract.recipient_tokens,
            metadata: id,
            escrow_tokens: contract.escrow_tokens,
            treasury: contract.treasury,
            treasury_tokens: contract.treasury_tokens,
            partner: contract.partner,
            partner_tokens: contract.partner_tokens,
            mint: contract.mint,
            token_program: contract_token_program(&contract),
        };
        let ix = instructions::cancel(self.program_id, &accounts)?;

        self.send(vec![ix], vec![]).await
    }

    async fn transfer(&self, params: TransferParams) -> SdkResult<TransactionId> {
        let (id, contract, stream) = self.stream(&params.id).await?;
        check_transfer(&stream, &params.invoker, &params.new_recipient)?;

        let new_recipient = params.new_recipient.as_solana()?;
        let token_program = contract_token_program(&contract);
        let accounts = TransferRecipientAccounts {
            authority: params.invoker.as_solana()?,
            new_recipient,
            new_recipient_tokens: find_associated_token_address(&new_recipient, &contract.mint, &token_program),
            metadata: id,
            mint: contract.mint,
            token_program,
        };
        let ix = transfer_recipient(self.program_id, &accounts)?;

        self.send(vec![ix], vec![]).await
    }

    async fn topup(&self, params: TopupParams) -> SdkResult<TransactionId> {
        let (id, contract, stream) = self.stream(&params.id).await?;
        check_topup(&stream, params.amount)?;

        let invoker = params.invoker.as_solana()?;
        let mut instructions = Vec::with_capacity(4);

        if contract.mint == NATIVE_MINT {
            let total_fee = stream.treasury_fee.percent.checked_add(stream.partner_fee.percent)?;
            let gross_amount = calculate_total_amount_to_deposit(params.amount, total_fee)?;
            instructions.extend(wrap_native(&invoker, gross_amount));
        }

        let token_program = contract_token_program(&contract);
        let accounts = TopupAccounts {
            sender: invoker,
            sender_tokens: find_associated_token_address(&invoker, &contract.mint, &token_program),
            metadata: id,
            escrow_tokens: contract.escrow_tokens,
            treasury: contract.treasury,
            treasury_tokens: contract.treasury_tokens,
            withdrawor: find_withdrawor_address(&self.program_id),
            partner: contract.partner,
            partner_tokens: contract.partner_tokens,
            mint: contract.mint,
            fee_oracle: self.config.fee_oracle(),
            token_program,
        };
        instructions.push(instructions::topup(self.program_id, &accounts, &TopupArgs { amount: params.amount })?);

        self.send(instructions, vec![]).await
    }

    async fn update(&self, params: UpdateParams) -> SdkResult<TransactionId> {
        let (id, _, stream) = self.stream(&params.id).await?;
        check_open(&stream)?;

        // Check: only the sender updates, and only the rates it allowed
        if params.invoker != stream.sender {
            return Err(SdkError::invalid(format!("{} can't update stream {}", params.invoker, stream.id)));
        }
        if params.amount_per_period.is_some() && !stream.flags.can_update_rate {
            return Err(SdkError::invalid(format!("stream {} does not allow rate updates", stream.id)));
        }

        let accounts = UpdateAccounts {
            authority: params.invoker.as_solana()?,
            metadata: id,
            withdrawor: find_withdrawor_address(&self.program_id),
        };
        let args = UpdateArgs {
            enable_automatic_withdrawal: params.enable_automatic_withdrawal,
            withdraw_frequency: params.withdraw_frequency,
            amount_per_period: params.amount_per_period,
        };
        let ix = instructions::update(self.program_id, &accounts, &args)?;

        self.send(vec![ix], vec![]).await
    }

    async fn pause(&self, params: PauseParams) -> SdkResult<TransactionId> {
        let (id, _, stream) = self.stream(&params.id).await?;
        check_pause(&stream, &params.invoker, true)?;

        let accounts = PauseAccounts { sender: params.invoker.as_solana()?, metadata: id };
        let ix = instructions::pause(self.program_id, &accounts)?;

        self.send(vec![ix], vec![]).await
    }

    async fn unpause(&self, params: PauseParams) -> SdkResult<TransactionId> {
        let (id, _, stream) = self.stream(&params.id).await?;
        check_pause(&stream, &params.invoker, false)?;

        let accounts = PauseAccounts { sender: params.invoker.as_solana()?, metadata: id };
        let ix = instructions::unpause(self.program_id, &accounts)?;

        self.send(vec![ix], vec![]).await
    }

    async fn get_one(&self, id: &Address) -> SdkResult<Stream> {
        let (_, _, stream) = self.stream(id).await?;
        Ok(stream)
    }

    async fn get_all(&self, params: GetAllParams) -> SdkResult<Vec<Stream>> {
        let owner = params.address.as_solana()?;
        let fields: &[&str] = match params.direction {
            StreamDirection::Outgoing => &["sender"],
            StreamDirection::Incoming => &["recipient"],
            StreamDirection::All => &["sender", "recipient"],
        };

        let program = Address::Solana(self.program_id);
        let mut seen = HashSet::new();
        let mut streams = Vec::new();

        for field in fields {
            let filters = vec![contract_filter(field, owner.as_ref())?];
            for (address, data) in self.transport.get_program_accounts(&program, filters).await? {
                // A stream can be both outgoing and incoming
                if !seen.insert(address) {
                    continue;
                }

                let id = address.as_solana()?;
                let contract = match decode_record::<Contract>(&data) {
                    Ok(contract) => contract,
                    Err(err) => {
                        msg!("Skipping undecodable stream account {}: {}", id, err);
                        continue;
                    }
                };

                let stream = contract.to_stream(id, self.config.pause_accounting());
                if params.stream_type.map_or(true, |stream_type| stream.stream_type == stream_type) {
                    streams.push(stream);
                }
            }
        }

        Ok(streams)
    }
}

fn parse_mint(token_id: &str) -> SdkResult<Pubkey> {
    token_id.parse::<Pubkey>().map_err(|_| SdkError::invalid(format!("invalid mint {token_id}")))
}

/// Token program that owns `token_account`, assuming it is the associated token account of `owner` for `mint`.
fn token_program_of(owner: &Pubkey, mint: &Pubkey, token_account: &Pubkey) -> Pubkey {
    if find_associated_token_address(owner, mint, &token_2022::ID) == *token_account {
        token_2022::ID
    } else {
        token::ID
    }
}

fn contract_token_program(contract: &Contract) -> Pubkey {
    token_program_of(&contract.recipient, &contract.mint, &contract.recipient_tokens)
}
