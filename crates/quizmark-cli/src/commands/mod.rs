pub mod evaluate;
pub mod grade;
pub mod init;
pub mod regrade;
pub mod serve;
pub mod validate;
