pub mod insight;
pub mod profile;
pub mod record;

pub use insight::MongoInsightRepository;
pub use profile::MongoProfileRepository;
pub use record::MongoRecordRepository;
