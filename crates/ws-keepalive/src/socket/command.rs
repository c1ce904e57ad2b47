use tokio::sync::oneshot;

use crate::errors::Result;

/// Messages that can be sent to the socket task
#[derive(Debug)]
pub(crate) enum SocketCommand {
	Send { payload: String, reply: oneshot::Sender<Result<()>> },

	Close { code: u16, reason: String, reply: oneshot::Sender<Result<()>> },
}
