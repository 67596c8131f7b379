pub mod mailer;
pub mod password;
pub mod users;
pub mod verification;
