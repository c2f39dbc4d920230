pub mod completions;
pub mod copy;
pub mod delete;
pub mod edit;
pub mod find;
pub mod init;
pub mod insert;
pub mod lock;
pub mod move_cmd;
pub mod serve;
pub mod show;
pub mod version;
