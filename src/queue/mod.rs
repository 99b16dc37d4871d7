// Job queue: publishing, in-process delivery, and execution

pub mod jobs;
pub mod local;
pub mod publisher;
pub mod workers;

pub use jobs::{Job, PublishReceipt};
pub use local::LocalQueue;
pub use publisher::{JobPublisher, QStashPublisher};
pub use workers::Worker;
