use std::sync::Arc;

use anchor_lang::prelude::*;

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
    codec::bcs::{
        encode_address, encode_bool, encode_bytes, encode_option_bool, encode_option_u64, encode_str, encode_u64,
        BcsWriter,
    },
    instructions::{InstructionArgs, UpdateArgs},
    state::{AccountAddress, Address, AptosContract, Stream},
    transport::{ChainPayload, EntryFunction, SubmitRequest, TransactionId, Transport},
    utils::{
        constants::{misc::WITHDRAW_ALL, programs::APTOS_PROTOCOL_MODULE},
        errors::{SdkError, SdkResult},
        program_errors::ErrorParser,
        validations::{check_cancel, check_create, check_open, check_pause, check_topup, check_transfer},
    },
};

/// Client for the Aptos stream module.
///
/// Streams are resources at addresses derived from the sender and a seed; the derivation is delegated to the
/// transport, so ephemeral stream keys do not apply here.
#[derive(Clone)]
pub struct AptosStreamClient {
    config: ClientConfig,
    module_address: AccountAddress,
    transport: Arc<dyn Transport>,
    parser: ErrorParser,
}

impl AptosStreamClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> SdkResult<Self> {
        let module_address = config.program_id()?.as_aptos()?;
        let parser = config.error_parser()?;

        Ok(Self { config, module_address, transport, parser })
    }

    pub fn module_address(&self) -> AccountAddress {
        self.module_address
    }

    fn entry(&self, function: &str, type_args: Vec<String>, args: Vec<Vec<u8>>) -> EntryFunction {
        EntryFunction {
            module_address: self.module_address.to_string(),
            module: APTOS_PROTOCOL_MODULE.to_string(),
            function: function.to_string(),
            type_args,
            args,
        }
    }

    async fn send(&self, entry: EntryFunction) -> SdkResult<TransactionId> {
        let reference = self.transport.prepare().await?;
        let request = SubmitRequest { payload: ChainPayload::Aptos(entry), reference };

        Ok(self.transport.submit_and_confirm(request).await?)
    }

    async fn stream(&self, id: &Address) -> SdkResult<(AccountAddress, Stream)> {
        let id = id.as_aptos()?;
        let data = self
            .transport
            .get_account(&Address::Aptos(id))
            .await?
            .ok_or_else(|| SdkError::AccountNotFound(id.to_string()))?;
        let stream = AptosContract::decode(&data)?.to_stream(id, self.module_address, self.config.pause_accounting())?;

        Ok((id, stream))
    }

    fn stream_address(&self, sender: &Address, source: MetadataSource) -> SdkResult<(Vec<u8>, Address)> {
        let MetadataSource::Derived { nonce } = source else {
            return Err(SdkError::invalid("Aptos streams are created at derived addresses, not ephemeral keys"));
        };

        let seed = nonce.to_le_bytes().to_vec();
        let address = self.transport.derive_address(sender, &seed)?;

        Ok((seed, address))
    }

    fn create_entry(&self, template: &StreamTemplate, grant: &RecipientSpec, seed: &[u8]) -> SdkResult<EntryFunction> {
        check_create(template, grant)?;

        // Check: the module unlocks the cliff amount at the start
        if template.effective_cliff() != template.start {
            return Err(SdkError::invalid("Aptos streams can't have a cliff after the start time"));
        }

        // Check: the coin type is set
        if template.token_id.is_empty() {
            return Err(SdkError::invalid("coin type is required"));
        }

        let recipient = grant.recipient.as_aptos()?;
        let partner = template.partner.map(|partner| partner.as_aptos()).transpose()?;
        let mut partner_arg = BcsWriter::new();
        partner_arg.write_option(partner.as_ref(), BcsWriter::write_address);

        let withdrawal_frequency =
            if template.automatic_withdrawal { template.withdrawal_frequency } else { template.period };

        let args = vec![
            encode_u64(grant.amount),
            encode_u64(template.period),
            encode_u64(grant.amount_per_period),
            encode_u64(template.start),
            encode_u64(grant.cliff_amount),
            encode_bool(template.cancelable_by_sender),
            encode_bool(template.cancelable_by_recipient),
            encode_bool(template.transferable_by_sender),
            encode_bool(template.transferable_by_recipient),
            encode_bool(template.can_topup),
            encode_bool(template.pausable.unwrap_or(false)),
            encode_bool(template.can_update_rate.unwrap_or(false)),
            encode_bool(template.automatic_withdrawal),
            encode_u64(withdrawal_frequency),
            encode_str(&grant.name),
            encode_address(&recipient),
            partner_arg.into_bytes(),
            encode_bytes(seed),
        ];

        Ok(self.entry("create", vec![template.token_id.clone()], args))
    }
}

impl StreamClient for AptosStreamClient {
    async fn create(&self, params: CreateStreamParams) -> SdkResult<CreateResult> {
        let CreateStreamParams { template, recipient, metadata } = params;
        let (seed, metadata) = self.stream_address(&template.sender, metadata)?;
        let entry = self.create_entry(&template, &recipient, &seed)?;

        let tx = self.send(entry).await?;

        Ok(CreateResult { tx, metadata })
    }

    async fn create_multiple(&self, params: CreateMultipleParams) -> SdkResult<BatchResult> {
        let CreateMultipleParams { template, recipients, ephemeral_keys, base_nonce } = params;

        // Check: stream addresses are derived on Aptos
        if ephemeral_keys.is_some() {
            return Err(SdkError::invalid("Aptos streams are created at derived addresses, not ephemeral keys"));
        }

        let mut items = Vec::with_capacity(recipients.len());
        for (index, grant) in recipients.iter().enumerate() {
            let nonce = base_nonce.checked_add(index as u64).ok_or(SdkError::ArithmeticOverflow)?;
            let (seed, metadata) = self.stream_address(&template.sender, MetadataSource::Derived { nonce })?;
            let entry = self.create_entry(&template, grant, &seed)?;

            items.push(BatchItem::new(grant.recipient, metadata, ChainPayload::Aptos(entry)));
        }

        // The native coin needs no wrapping
        let plan = BatchPlan { wrap: None, items, mode: DispatchMode::for_batch(false) };
        let options = BatchOptions { submit_timeout: self.config.submit_timeout, ..Default::default() };

        execute_batch(Arc::clone(&self.transport), plan, &self.parser, options).await
    }

    async fn withdraw(&self, params: WithdrawParams) -> SdkResult<TransactionId> {
        let (id, stream) = self.stream(&params.id).await?;
        check_open(&stream)?;

        // Check: an explicit amount fits in what is left
        if params.amount != WITHDRAW_ALL && params.amount > stream.remaining() {
            return Err(SdkError::invalid(format!(
                "withdraw amount {} exceeds the remaining {}",
                params.amount,
                stream.remaining()
            )));
        }

        let args = vec![encode_address(&id), encode_u64(params.amount)];
        self.send(self.entry("withdraw", vec![stream.token_id], args)).await
    }

    async fn cancel(&self, params: CancelParams) -> SdkResult<TransactionId> {
        let (id, stream) = self.stream(&params.id).await?;
        check_cancel(&stream, &params.invoker)?;

        self.send(self.entry("cancel", vec![stream.token_id], vec![encode_address(&id)])).await
    }

    async fn transfer(&self, params: TransferParams) -> SdkResult<TransactionId> {
        let (id, stream) = self.stream(&params.id).await?;
        check_transfer(&stream, &params.invoker, &params.new_recipient)?;

        let args = vec![encode_address(&id), encode_address(&params.new_recipient.as_aptos()?)];
        self.send(self.entry("transfer", vec![stream.token_id], args)).await
    }

    async fn topup(&self, params: TopupParams) -> SdkResult<TransactionId> {
        let (id, stream) = self.stream(&params.id).await?;
        check_topup(&stream, params.amount)?;

        let args = vec![encode_address(&id), encode_u64(params.amount)];
        self.send(self.entry("topup", vec![stream.token_id], args)).await
    }

    async fn update(&self, params: UpdateParams) -> SdkResult<TransactionId> {
        let (id, stream) = self.stream(&params.id).await?;
        check_open(&stream)?;

        // Check: only the sender updates, and only the rates it allowed
        if params.invoker != stream.sender {
            return Err(SdkError::invalid(format!("{} can't update stream {}", params.invoker, stream.id)));
        }
        if params.amount_per_period.is_some() && !stream.flags.can_update_rate {
            return Err(SdkError::invalid(format!("stream {} does not allow rate updates", stream.id)));
        }

        UpdateArgs {
            enable_automatic_withdrawal: params.enable_automatic_withdrawal,
            withdraw_frequency: params.withdraw_frequency,
            amount_per_period: params.amount_per_period,
        }
        .validate()?;

        let args = vec![
            encode_address(&id),
            encode_option_bool(params.enable_automatic_withdrawal),
            encode_option_u64(params.withdraw_frequency),
            encode_option_u64(params.amount_per_period),
        ];
        self.send(self.entry("update", vec![stream.token_id], args)).await
    }

    async fn pause(&self, params: PauseParams) -> SdkResult<TransactionId> {
        let (id, stream) = self.stream(&params.id).await?;
        check_pause(&stream, &params.invoker, true)?;

        self.send(self.entry("pause", vec![stream.token_id], vec![encode_address(&id)])).await
    }

    async fn unpause(&self, params: PauseParams) -> SdkResult<TransactionId> {
        let (id, stream) = self.stream(&params.id).await?;
        check_pause(&stream, &params.invoker, false)?;

        self.send(self.entry("unpause", vec![stream.token_id], vec![encode_address(&id)])).await
    }

    async fn get_one(&self, id: &Address) -> SdkResult<Stream> {
        let (_, stream) = self.stream(id).await?;
        Ok(stream)
    }

    async fn get_all(&self, params: GetAllParams) -> SdkResult<Vec<Stream>> {
        let module = Address::Aptos(self.module_address);
        let resources = self.transport.get_program_accounts(&module, vec![]).await?;

        let mut streams = Vec::new();
        for (address, data) in resources {
            let id = address.as_aptos()?;
            let stream = match AptosContract::decode(&data)
                .and_then(|contract| contract.to_stream(id, self.module_address, self.config.pause_accounting()))
            {
                Ok(stream) => stream,
                Err(err) => {
                    msg!("Skipping undecodable stream resource {}: {}", id, err);
                    continue;
                }
            };

            let involved = match params.direction {
                StreamDirection::Outgoing => stream.sender == params.address,
                StreamDirection::Incoming => stream.recipient == params.address,
                StreamDirection::All => stream.sender == params.address || stream.recipient == params.address,
            };
            if involved && params.stream_type.map_or(true, |stream_type| stream.stream_type == stream_type) {
                streams.push(stream);
            }
        }

        Ok(streams)
    }
}
