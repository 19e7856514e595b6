mod decrypt;
mod encrypt;
mod epoch;
mod grant;
mod keygen;
mod message;
mod open_grant;

pub use decrypt::Decrypt;
pub use encrypt::Encrypt;
pub use epoch::{current_epoch, Epoch};
pub use grant::GrantPost;
pub use keygen::Keygen;
pub use message::Message;
pub use open_grant::OpenGrant;
