mod common;

use std::sync::Arc;

use anchor_lang::{prelude::*, Discriminator};
use common::{encode_contract, solana_contract, MockTransport, NOW};
use vesting_sdk::{
    client::{
        CancelParams, Cluster, CreateMultipleParams, CreateStreamParams, GetAllParams, MetadataSource, RecipientSpec,
        SolanaStreamClient, StreamDirection, StreamTemplate, WithdrawParams,
    },
    instructions::{CreateArgs, WithdrawArgs},
    state::{Address, Chain},
    transport::ChainPayload,
    utils::{
        calculate_total_amount_to_deposit,
        constants::programs::{NATIVE_MINT, STREAM_PROGRAM_DEVNET},
        pda::find_metadata_address,
        FeePercent,
    },
    ChainClient, ClientConfig, SdkError, StreamClient,
};

fn config() -> ClientConfig {
    ClientConfig::new(Chain::Solana, Cluster::Devnet)
}

fn template(sender: Pubkey, mint: Pubkey) -> StreamTemplate {
    StreamTemplate {
        sender: Address::Solana(sender),
        token_id: mint.to_string(),
        token_program: None,
        start: NOW,
        period: 60,
        cliff: 0,
        cancelable_by_sender: true,
        cancelable_by_recipient: false,
        transferable_by_sender: false,
        transferable_by_recipient: true,
        can_topup: false,
        automatic_withdrawal: false,
        withdrawal_frequency: 0,
        pausable: None,
        can_update_rate: None,
        partner: None,
        is_native: false,
    }
}

fn recipient(name: &str) -> RecipientSpec {
    RecipientSpec {
        recipient: Address::Solana(Pubkey::new_unique()),
        amount: 1_000,
        name: name.to_string(),
        cliff_amount: 100,
        amount_per_period: 10,
    }
}

fn instructions_of(payload: &ChainPayload) -> &[anchor_lang::solana_program::instruction::Instruction] {
    match payload {
        ChainPayload::Solana { instructions, .. } => instructions,
        ChainPayload::Aptos(_) => panic!("expected a Solana payload"),
    }
}

#[tokio::test]
async fn get_one_decodes_the_stream_account() {
    let (id, sender, recipient) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
    let contract = solana_contract(sender, recipient, Pubkey::new_unique());
    let transport = Arc::new(MockTransport::new().with_account(Address::Solana(id), encode_contract(&contract)));
    let client = SolanaStreamClient::new(config(), transport).unwrap();

    let stream = client.get_one(&Address::Solana(id)).await.unwrap();

    assert_eq!(stream.id, Address::Solana(id));
    assert_eq!(stream.name, "payroll");
    assert_eq!(stream.sender, Address::Solana(sender));
    assert_eq!(stream.deposited_amount, 1_000);
    assert_eq!(stream.unlocked(NOW - 1), 0);
    assert_eq!(stream.unlocked(NOW), 100);
    assert_eq!(stream.unlocked(NOW + 55), 150);
}

#[tokio::test]
async fn missing_stream_is_reported() {
    let client = SolanaStreamClient::new(config(), Arc::new(MockTransport::new())).unwrap();
    let id = Address::Solana(Pubkey::new_unique());

    assert!(matches!(client.get_one(&id).await, Err(SdkError::AccountNotFound(_))));
}

#[tokio::test]
async fn create_at_derived_address() {
    let transport = Arc::new(MockTransport::new());
    let client = SolanaStreamClient::new(config(), transport.clone()).unwrap();
    let sender = Pubkey::new_unique();

    let params = CreateStreamParams {
        template: template(sender, Pubkey::new_unique()),
        recipient: recipient("salary"),
        metadata: MetadataSource::Derived { nonce: 7 },
    };
    let result = client.create(params).await.unwrap();

    assert_eq!(result.metadata, Address::Solana(find_metadata_address(&STREAM_PROGRAM_DEVNET, &sender, 7)));

    let submitted = transport.submitted();
    assert_eq!(submitted.len(), 1);
    let ChainPayload::Solana { instructions, signers } = &submitted[0].payload else {
        panic!("expected a Solana payload");
    };
    assert!(signers.is_empty());
    assert_eq!(instructions.len(), 1);
    assert_eq!(instructions[0].program_id, STREAM_PROGRAM_DEVNET);
    assert_eq!(&instructions[0].data[..8], CreateArgs::DISCRIMINATOR);
    // Derived stream accounts don't sign
    assert!(!instructions[0].accounts[3].is_signer);
}

#[tokio::test]
async fn native_deposit_is_wrapped_gross_of_fees() {
    let transport = Arc::new(MockTransport::new());
    let client = SolanaStreamClient::new(config(), transport.clone()).unwrap();
    let sender = Pubkey::new_unique();

    let mut template = template(sender, NATIVE_MINT);
    template.is_native = true;
    let params =
        CreateStreamParams { template, recipient: recipient("wrapped"), metadata: MetadataSource::Derived { nonce: 0 } };
    client.create(params).await.unwrap();

    let submitted = transport.submitted();
    let instructions = instructions_of(&submitted[0].payload);
    assert_eq!(instructions.len(), 4);

    // No fee oracle account: the default treasury fee applies
    let gross = calculate_total_amount_to_deposit(1_000, FeePercent::DEFAULT_TREASURY).unwrap();
    assert_eq!(instructions[1].data[4..12], gross.to_le_bytes());
    assert_eq!(&instructions[3].data[..8], CreateArgs::DISCRIMINATOR);
}

#[tokio::test]
async fn ephemeral_batch_is_sequential_and_signed() {
    let transport = Arc::new(MockTransport::new());
    let client = SolanaStreamClient::new(config(), transport.clone()).unwrap();
    let keys: Vec<Address> = (0..3).map(|_| Address::Solana(Pubkey::new_unique())).collect();

    let params = CreateMultipleParams {
        template: template(Pubkey::new_unique(), Pubkey::new_unique()),
        recipients: vec![recipient("a"), recipient("b"), recipient("c")],
        ephemeral_keys: Some(keys.clone()),
        base_nonce: 0,
    };
    let result = client.create_multiple(params).await.unwrap();

    assert_eq!(result.metadatas, keys);
    assert_eq!(result.txs.len(), 3);
    assert!(result.errors.is_empty());
    assert_eq!(transport.max_in_flight(), 1);

    for (request, key) in transport.submitted().iter().zip(&keys) {
        let ChainPayload::Solana { signers, .. } = &request.payload else {
            panic!("expected a Solana payload");
        };
        assert_eq!(signers, &vec![key.as_solana().unwrap()]);
    }
}

#[tokio::test]
async fn ephemeral_key_count_must_match() {
    let transport = Arc::new(MockTransport::new());
    let client = SolanaStreamClient::new(config(), transport.clone()).unwrap();

    let params = CreateMultipleParams {
        template: template(Pubkey::new_unique(), Pubkey::new_unique()),
        recipients: vec![recipient("a"), recipient("b")],
        ephemeral_keys: Some(vec![Address::Solana(Pubkey::new_unique())]),
        base_nonce: 0,
    };

    assert!(matches!(client.create_multiple(params).await, Err(SdkError::InvalidParameter(_))));
    assert!(transport.submitted().is_empty());
}

#[tokio::test]
async fn derived_batch_uses_consecutive_nonces() {
    let transport = Arc::new(MockTransport::new());
    let client = SolanaStreamClient::new(config(), transport).unwrap();
    let sender = Pubkey::new_unique();

    let params = CreateMultipleParams {
        template: template(sender, Pubkey::new_unique()),
        recipients: vec![recipient("a"), recipient("b")],
        ephemeral_keys: None,
        base_nonce: 40,
    };
    let result = client.create_multiple(params).await.unwrap();

    let expected: Vec<Address> =
        (40..42).map(|nonce| Address::Solana(find_metadata_address(&STREAM_PROGRAM_DEVNET, &sender, nonce))).collect();
    assert_eq!(result.metadatas, expected);
}

#[tokio::test]
async fn withdraw_checks_the_remaining_amount() {
    let (id, recipient) = (Pubkey::new_unique(), Pubkey::new_unique());
    let contract = solana_contract(Pubkey::new_unique(), recipient, Pubkey::new_unique());
    let transport = Arc::new(MockTransport::new().with_account(Address::Solana(id), encode_contract(&contract)));
    let client = SolanaStreamClient::new(config(), transport.clone()).unwrap();

    let too_much = WithdrawParams { id: Address::Solana(id), invoker: Address::Solana(recipient), amount: 1_001 };
    assert!(matches!(client.withdraw(too_much).await, Err(SdkError::InvalidParameter(_))));
    assert!(transport.submitted().is_empty());

    client.withdraw(WithdrawParams::all(Address::Solana(id), Address::Solana(recipient))).await.unwrap();
    let submitted = transport.submitted();
    let instructions = instructions_of(&submitted[0].payload);
    assert_eq!(&instructions[0].data[..8], WithdrawArgs::DISCRIMINATOR);
    assert_eq!(instructions[0].data[8..16], u64::MAX.to_le_bytes());
}

#[tokio::test]
async fn cancel_follows_the_stream_flags() {
    let (id, sender, recipient) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
    let contract = solana_contract(sender, recipient, Pubkey::new_unique());
    let transport = Arc::new(MockTransport::new().with_account(Address::Solana(id), encode_contract(&contract)));
    let client = SolanaStreamClient::new(config(), transport.clone()).unwrap();

    let by_recipient = CancelParams { id: Address::Solana(id), invoker: Address::Solana(recipient) };
    assert!(client.cancel(by_recipient).await.is_err());

    let by_sender = CancelParams { id: Address::Solana(id), invoker: Address::Solana(sender) };
    client.cancel(by_sender).await.unwrap();
    assert_eq!(transport.submitted().len(), 1);
}

#[tokio::test]
async fn get_all_filters_by_direction() {
    let (owner, other, mint) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
    let (to_self, incoming, unrelated) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());

    let transport = Arc::new(
        MockTransport::new()
            .with_account(Address::Solana(to_self), encode_contract(&solana_contract(owner, owner, mint)))
            .with_account(Address::Solana(incoming), encode_contract(&solana_contract(other, owner, mint)))
            .with_account(Address::Solana(unrelated), encode_contract(&solana_contract(other, other, mint)))
            .with_account(Address::Solana(Pubkey::new_unique()), vec![0xde, 0xad]),
    );
    let client = ChainClient::new(config(), transport).unwrap();
    assert_eq!(client.chain(), Chain::Solana);

    let all = client
        .get_all(GetAllParams { address: Address::Solana(owner), direction: StreamDirection::All, stream_type: None })
        .await
        .unwrap();
    let mut ids: Vec<Address> = all.iter().map(|stream| stream.id).collect();
    ids.sort_by_key(|id| id.to_bytes());
    let mut expected = vec![Address::Solana(to_self), Address::Solana(incoming)];
    expected.sort_by_key(|id| id.to_bytes());
    assert_eq!(ids, expected);

    let outgoing = client
        .get_all(GetAllParams {
            address: Address::Solana(owner),
            direction: StreamDirection::Outgoing,
            stream_type: None,
        })
        .await
        .unwrap();
    assert_eq!(outgoing.len(), 1);
    assert_eq!(outgoing[0].id, Address::Solana(to_self));
}
