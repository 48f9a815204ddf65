pub mod cache;
pub mod diff;
pub mod git;
pub mod github;
pub mod history;
pub mod pager;
pub mod stats;
pub mod window;
