mod deserialize;
pub mod msg;
mod receiver;
pub mod records;
mod sender;
mod serialize;

use tokio::io::{AsyncRead, AsyncWrite};

pub use deserialize::Deserialize;
pub use msg::Msg;
pub use receiver::PairReceiver;
pub use records::{Records, RecordsErr};
pub use sender::PairSender;
pub use serialize::Serialize;

type LenType = u64;
const LEN_TYPE_SIZE: usize = size_of::<LenType>();

/// Creates both `PairReceiver` and `PairSender` network channel parts.
///
/// Given a writer and reader creates and returns both ends of the communication with the
/// single peer on the other side.
///
/// # Arguments
/// * `rx` - An async readable.
/// * `tx` - An async writable.
///
/// # Returns
/// A communication stream in the form of a pair receiver and sender.
pub fn channel<R, W>(rx: R, tx: W) -> (PairReceiver<R>, PairSender<W>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    (PairReceiver::new(rx), PairSender::new(tx))
}
