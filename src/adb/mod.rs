pub mod connection;
pub mod file_transfer;
pub mod protocol;
pub mod server;
pub mod shell;

pub use connection::AdbConnection;
pub use file_transfer::FileTransfer;
pub use protocol::{SyncProtocol, SyncStat};
pub use server::AdbServer;
pub use shell::{shell_quote, ShellCommand, ShellOutput};
