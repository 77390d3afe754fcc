use anchor_lang::prelude::*;
use solana_keccak_hasher::hashv as keccak;

use crate::{
    client::params::{RecipientSpec, StreamTemplate},
    state::{Address, MerkleDistributor, Stream},
    utils::{
        constants::misc::{MAX_PROOF_LEN, STREAM_NAME_CAPACITY},
        errors::{SdkError, SdkResult},
    },
};

/// Validate the creation of a stream for one recipient.
pub fn check_create(template: &StreamTemplate, recipient: &RecipientSpec) -> SdkResult<()> {
    // Check: the start time is set.
    if template.start == 0 {
        return Err(SdkError::invalid("start time can't be zero"));
    }

    // Check: the period is positive.
    if template.period == 0 {
        return Err(SdkError::invalid("period must be positive"));
    }

    // Check: the cliff is not before the start.
    if template.cliff != 0 && template.cliff < template.start {
        return Err(SdkError::invalid("cliff can't be before the start time"));
    }

    // Check: the deposit is positive.
    if recipient.amount == 0 {
        return Err(SdkError::invalid(format!("deposit for {} must be positive", recipient.recipient)));
    }

    // Check: the cliff unlock fits in the deposit.
    if recipient.cliff_amount > recipient.amount {
        return Err(SdkError::invalid(format!("cliff amount for {} exceeds the deposit", recipient.recipient)));
    }

    // Check: something streams after the cliff, unless the cliff unlocks everything.
    if recipient.amount_per_period == 0 && recipient.cliff_amount < recipient.amount {
        return Err(SdkError::invalid(format!("amount per period for {} must be positive", recipient.recipient)));
    }

    // Check: automatic withdrawals have a frequency.
    if template.automatic_withdrawal && template.withdrawal_frequency == 0 {
        return Err(SdkError::invalid("automatic withdrawal requires a withdrawal frequency"));
    }

    // Check: the name fits the fixed-size field.
    check_name(&recipient.name)?;

    // Check: the recipient is on the same chain as the sender.
    if template.sender.chain() != recipient.recipient.chain() {
        return Err(SdkError::invalid("sender and recipient are on different chains"));
    }

    Ok(())
}

/// Validate a stream name against the fixed-size on-chain field.
pub fn check_name(name: &str) -> SdkResult<()> {
    if name.len() > STREAM_NAME_CAPACITY {
        return Err(SdkError::InputTooLong { field: "stream name", len: name.len(), capacity: STREAM_NAME_CAPACITY });
    }

    Ok(())
}

/// Validate a cancel by `invoker`.
pub fn check_cancel(stream: &Stream, invoker: &Address) -> SdkResult<()> {
    check_open(stream)?;

    // Check: the invoker is allowed to cancel.
    let allowed = (*invoker == stream.sender && stream.flags.cancelable_by_sender)
        || (*invoker == stream.recipient && stream.flags.cancelable_by_recipient);
    if !allowed {
        return Err(SdkError::invalid(format!("{invoker} can't cancel stream {}", stream.id)));
    }

    Ok(())
}

/// Validate a transfer of the recipient role by `invoker` to `new_recipient`.
pub fn check_transfer(stream: &Stream, invoker: &Address, new_recipient: &Address) -> SdkResult<()> {
    check_open(stream)?;

    // Check: the invoker is allowed to transfer.
    let allowed = (*invoker == stream.sender && stream.flags.transferable_by_sender)
        || (*invoker == stream.recipient && stream.flags.transferable_by_recipient);
    if !allowed {
        return Err(SdkError::invalid(format!("{invoker} can't transfer stream {}", stream.id)));
    }

    // Check: the transfer changes the recipient.
    if *new_recipient == stream.recipient {
        return Err(SdkError::invalid("new recipient is the current recipient"));
    }

    Ok(())
}

/// Validate a top-up of `amount`.
pub fn check_topup(stream: &Stream, amount: u64) -> SdkResult<()> {
    check_open(stream)?;

    if !stream.flags.can_topup {
        return Err(SdkError::invalid(format!("stream {} can't be topped up", stream.id)));
    }
    if amount == 0 {
        return Err(SdkError::invalid("top-up amount must be positive"));
    }

    Ok(())
}

/// Validate a pause or unpause by `invoker`.
pub fn check_pause(stream: &Stream, invoker: &Address, pause: bool) -> SdkResult<()> {
    check_open(stream)?;

    // Check: only the sender pauses pausable streams.
    if !stream.flags.pausable {
        return Err(SdkError::invalid(format!("stream {} is not pausable", stream.id)));
    }
    if *invoker != stream.sender {
        return Err(SdkError::invalid(format!("{invoker} can't pause stream {}", stream.id)));
    }

    // Check: the transition is meaningful.
    if pause && stream.is_paused() {
        return Err(SdkError::invalid(format!("stream {} is already paused", stream.id)));
    }
    if !pause && !stream.is_paused() {
        return Err(SdkError::invalid(format!("stream {} is not paused", stream.id)));
    }

    Ok(())
}

/// Validate that a stream still accepts operations.
pub fn check_open(stream: &Stream) -> SdkResult<()> {
    if stream.closed {
        return Err(SdkError::invalid(format!("stream {} is closed", stream.id)));
    }

    Ok(())
}

/// Validate a claim against the distributor's merkle root before it is submitted.
pub fn check_claim(
    distributor: &MerkleDistributor,
    claimant: &Pubkey,
    amount_unlocked: u64,
    amount_locked: u64,
    merkle_proof: &[[u8; 32]],
    now: u64,
) -> SdkResult<()> {
    // Check: the distributor has started.
    if !distributor.has_started(now) {
        return Err(SdkError::invalid("claiming has not started"));
    }

    // Check: the distributor has not been clawed back.
    if distributor.clawed_back {
        return Err(SdkError::invalid("distributor was clawed back"));
    }

    // Check: the proof is not longer than the program accepts.
    if merkle_proof.len() > MAX_PROOF_LEN {
        return Err(SdkError::InputTooLong { field: "merkle proof", len: merkle_proof.len(), capacity: MAX_PROOF_LEN });
    }

    let leaf_hash = compute_leaf_hash(claimant, amount_unlocked, amount_locked);

    // Check: the proof resolves to the root.
    if compute_root(leaf_hash, merkle_proof) != distributor.root {
        return Err(SdkError::invalid("merkle proof does not match the distributor root"));
    }

    Ok(())
}

/// Validate a clawback at `now`.
pub fn check_clawback(distributor: &MerkleDistributor, now: u64) -> SdkResult<()> {
    // Check: nothing was clawed back already.
    if distributor.clawed_back {
        return Err(SdkError::invalid("distributor was already clawed back"));
    }

    // Check: the clawback window is open.
    if now < distributor.clawback_start_ts {
        return Err(SdkError::invalid("clawback is not allowed before the clawback start"));
    }

    Ok(())
}

/// Hash of a distributor leaf. The leaf is hashed twice so that an inner node can never be passed off as a leaf.
pub fn compute_leaf_hash(claimant: &Pubkey, amount_unlocked: u64, amount_locked: u64) -> [u8; 32] {
    let claimant_bytes = claimant.to_bytes();
    let unlocked_bytes = amount_unlocked.to_le_bytes();
    let locked_bytes = amount_locked.to_le_bytes();
    let leaf_bytes: &[&[u8]] = &[&claimant_bytes, &unlocked_bytes, &locked_bytes];
    let leaf_hash = keccak(leaf_bytes).to_bytes();

    keccak(&[&leaf_hash]).to_bytes()
}

/// Folds the proof into the leaf hash, hashing each pair in sorted order.
pub fn compute_root(leaf_hash: [u8; 32], merkle_proof: &[[u8; 32]]) -> [u8; 32] {
    merkle_proof.iter().fold(leaf_hash, |computed_hash, proof_element| {
        if computed_hash <= *proof_element {
            keccak(&[&computed_hash, proof_element]).to_bytes()
        } else {
            keccak(&[proof_element, &computed_hash]).to_bytes()
        }
    })
}
