mod mailer;

pub use mailer::{HttpMailerService, IMailerService, InMemoryMailerService, OutboundEmail};
