//! Decision Jar Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - pool: Allocation and spin algorithms, free of storage
//! - repository: Data access abstractions and implementations
//! - commands: Permission-checked operations
//! - cli: clap front end printing JSON

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod pool;
pub mod repository;

use rand::rngs::StdRng;

use config::AppConfig;
use repository::{init_db, DbState, IdeaRepository, JarRepository, MembershipRepository, PoolRepository};

/// Application state shared across commands
pub struct AppState {
    pub db_state: DbState,
    pub config: AppConfig,
    pub jar_repo: JarRepository,
    pub member_repo: MembershipRepository,
    pub idea_repo: IdeaRepository,
    pub pool_repo: PoolRepository,
}

impl AppState {
    /// Open the configured database and wire up the repositories
    pub async fn open(config: AppConfig) -> Result<Self, String> {
        let db_state = init_db(&config.db_path, config.busy_timeout()).await?;
        let pool_repo = PoolRepository::new(db_state.handle());
        Ok(Self::assemble(db_state, config, pool_repo))
    }

    /// Same as `open` with a caller-provided random source
    pub async fn open_with_rng(config: AppConfig, rng: StdRng) -> Result<Self, String> {
        let db_state = init_db(&config.db_path, config.busy_timeout()).await?;
        let pool_repo = PoolRepository::with_rng(db_state.handle(), rng);
        Ok(Self::assemble(db_state, config, pool_repo))
    }

    fn assemble(db_state: DbState, config: AppConfig, pool_repo: PoolRepository) -> Self {
        Self {
            jar_repo: JarRepository::new(db_state.handle()),
            member_repo: MembershipRepository::new(db_state.handle()),
            idea_repo: IdeaRepository::new(db_state.handle()),
            pool_repo,
            db_state,
            config,
        }
    }
}
