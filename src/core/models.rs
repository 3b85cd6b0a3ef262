pub mod answer;
pub mod choice;
pub mod common;
pub mod question;
pub mod response;
pub mod result;
pub mod survey;
pub mod user;
