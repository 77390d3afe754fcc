use std::fmt;

use crate::state::Stream;

/// Product category of a stream, derived from its capabilities and amounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StreamType {
    /// Open-ended: the deposit can be topped up.
    Payment,
    #[default]
    Vesting,
    /// Everything unlocks at the cliff and nobody can cancel.
    Lock,
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payment => write!(f, "payment"),
            Self::Vesting => write!(f, "vesting"),
            Self::Lock => write!(f, "lock"),
        }
    }
}

/// Returns whether the stream is a payment stream: sender can top up.
pub fn is_payment(stream: &Stream) -> bool {
    stream.flags.can_topup
}

/// Returns whether the stream is a token lock: not a payment, no automatic withdrawals, cancelable and transferable
/// by nobody, and (almost) the whole deposit unlocks at the cliff.
pub fn is_lock(stream: &Stream) -> bool {
    let flags = &stream.flags;
    !flags.can_topup
        && !flags.automatic_withdrawal
        && !flags.cancelable_by_sender
        && !flags.cancelable_by_recipient
        && !flags.transferable_by_sender
        && !flags.transferable_by_recipient
        && stream.cliff_amount >= stream.deposited_amount.saturating_sub(1)
}

/// Returns whether the stream is a vesting schedule: neither a payment nor a lock.
pub fn is_vesting(stream: &Stream) -> bool {
    !is_payment(stream) && !is_lock(stream)
}

/// Returns the stream's type. Payment is checked first, then lock; everything else is vesting.
pub fn classify(stream: &Stream) -> StreamType {
    if is_payment(stream) {
        StreamType::Payment
    } else if is_lock(stream) {
        StreamType::Lock
    } else {
        StreamType::Vesting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{stream::sample_stream, StreamFlags};

    fn assert_exclusive(stream: &Stream) {
        let hits = [is_payment(stream), is_vesting(stream), is_lock(stream)].iter().filter(|hit| **hit).count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn payment_when_topup_is_allowed() {
        let mut stream = sample_stream();
        stream.flags = StreamFlags { can_topup: true, ..Default::default() };
        stream.cliff_amount = stream.deposited_amount;
        assert_eq!(classify(&stream), StreamType::Payment);
        assert_exclusive(&stream);
    }

    #[test]
    fn lock_when_everything_unlocks_at_cliff() {
        let mut stream = sample_stream();
        stream.flags = StreamFlags::default();
        stream.cliff_amount = stream.deposited_amount - 1;
        assert_eq!(classify(&stream), StreamType::Lock);
        assert_exclusive(&stream);

        stream.flags.cancelable_by_recipient = true;
        assert_eq!(classify(&stream), StreamType::Vesting);
        assert_exclusive(&stream);

        stream.flags = StreamFlags { transferable_by_sender: true, ..Default::default() };
        assert_eq!(classify(&stream), StreamType::Vesting);

        stream.flags = StreamFlags { automatic_withdrawal: true, ..Default::default() };
        assert_eq!(classify(&stream), StreamType::Vesting);
    }

    #[test]
    fn vesting_otherwise() {
        let mut stream = sample_stream();
        stream.flags = StreamFlags { cancelable_by_sender: true, ..Default::default() };
        assert_eq!(classify(&stream), StreamType::Vesting);
        assert_exclusive(&stream);

        stream.flags.cancelable_by_sender = false;
        stream.cliff_amount = 0;
        assert_eq!(classify(&stream), StreamType::Vesting);
        assert_exclusive(&stream);
    }
}
