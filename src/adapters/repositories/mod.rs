mod pg_metadata_repository;

pub use pg_metadata_repository::PgMetadataRepository;
