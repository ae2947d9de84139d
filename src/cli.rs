//! decision-jar CLI
//!
//! Thin clap front end over the commands layer. Every result is printed as
//! pretty JSON; failures print the tagged `DomainError` and exit non-zero.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::commands::{self, IdeaDraft, IdeaScope};
use crate::config::{AppConfig, ENV_DB, ENV_LOG_DIR};
use crate::domain::{CostTier, DomainError, DomainResult, MemberRole, MemberStatus, Setting, SpinFilters, TimeOfDay, Weather};
use crate::AppState;

#[derive(Debug, Parser)]
#[command(name = "decision-jar")]
#[command(about = "Shared idea jars: fair random allocation and filtered spins", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./decision_jar.json when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, env = ENV_DB, global = true)]
    pub db: Option<PathBuf>,

    /// Directory for rolling log files
    #[arg(long, env = ENV_LOG_DIR, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Participant performing the action
    #[arg(long = "as", env = "DECISION_JAR_USER", global = true)]
    pub actor: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage jars
    Jar {
        #[command(subcommand)]
        command: JarCommands,
    },

    /// Manage jar membership
    Member {
        #[command(subcommand)]
        command: MemberCommands,
    },

    /// Submit and moderate ideas
    Idea {
        #[command(subcommand)]
        command: IdeaCommands,
    },

    /// Give every active member QUOTA random ideas (admin)
    Allocate {
        jar: u32,
        #[arg(short, long)]
        quota: u32,
    },

    /// Pick one random idea matching the filters
    Spin {
        jar: u32,
        #[command(flatten)]
        filters: SpinArgs,
    },

    /// Show who and what the next allocation draws from
    Eligibility { jar: u32 },

    /// Print the effective configuration
    Config,
}

#[derive(Debug, Subcommand)]
pub enum JarCommands {
    /// Create a jar owned by the acting participant
    Create {
        name: String,
        /// Ideas from plain members wait for approval
        #[arg(long)]
        requires_approval: bool,
    },
    /// Jars the acting participant belongs to
    List,
    Show { jar: u32 },
    Rename { jar: u32, name: String },
    /// Turn idea moderation on or off
    Approval {
        jar: u32,
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Delete the jar with all ideas and members (owner)
    Delete { jar: u32 },
    /// Remove every idea from the jar (admin)
    Reset { jar: u32 },
}

#[derive(Debug, Subcommand)]
pub enum MemberCommands {
    /// Add an active member (admin)
    Add {
        jar: u32,
        participant: String,
        #[arg(long, default_value = "member", value_parser = parse_role)]
        role: MemberRole,
    },
    /// Ask to join a jar
    Join { jar: u32 },
    /// Set a membership status: active, pending or rejected (admin)
    Status {
        jar: u32,
        participant: String,
        #[arg(value_parser = parse_status)]
        status: MemberStatus,
    },
    /// Change a member's role (owner)
    Role {
        jar: u32,
        participant: String,
        #[arg(value_parser = parse_role)]
        role: MemberRole,
    },
    List { jar: u32 },
}

#[derive(Debug, Subcommand)]
pub enum IdeaCommands {
    /// Submit an idea
    Add {
        jar: u32,
        description: String,
        #[command(flatten)]
        attributes: IdeaArgs,
    },
    /// Edit an idea (author or admin)
    Update {
        idea: u32,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        attributes: IdeaArgs,
    },
    Approve { idea: u32 },
    Reject { idea: u32 },
    List {
        jar: u32,
        /// all, mine, selected or pending
        #[arg(long, default_value = "all", value_parser = parse_scope)]
        scope: IdeaScope,
    },
    Show { idea: u32 },
    /// Delete one idea, or several when --jar is given (admin)
    Delete {
        #[arg(required = true)]
        ideas: Vec<u32>,
        #[arg(long)]
        jar: Option<u32>,
    },
    /// Clear allocation and selection (admin)
    Return { idea: u32 },
}

#[derive(Debug, Clone, Default, Args)]
pub struct IdeaArgs {
    #[arg(long)]
    pub details: Option<String>,
    /// free, low, medium, high (or $, $$, $$$)
    #[arg(long, value_parser = parse_cost)]
    pub cost: Option<CostTier>,
    #[arg(long)]
    pub minutes: Option<u32>,
    #[arg(long, value_parser = parse_setting)]
    pub setting: Option<Setting>,
    #[arg(long = "time", value_parser = parse_time_of_day)]
    pub time_of_day: Option<TimeOfDay>,
    #[arg(long, value_parser = parse_weather)]
    pub weather: Option<Weather>,
    #[arg(long)]
    pub category: Option<String>,
}

impl IdeaArgs {
    fn into_draft(self, description: String) -> IdeaDraft {
        IdeaDraft {
            description,
            details: self.details,
            cost: self.cost,
            duration_minutes: self.minutes,
            setting: self.setting,
            time_of_day: self.time_of_day,
            weather: self.weather,
            category: self.category,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct SpinArgs {
    #[arg(long)]
    pub min_minutes: Option<u32>,
    #[arg(long)]
    pub max_minutes: Option<u32>,
    /// Repeatable
    #[arg(long = "cost", value_parser = parse_cost)]
    pub costs: Vec<CostTier>,
    #[arg(long = "category")]
    pub categories: Vec<String>,
    #[arg(long = "time", value_parser = parse_time_of_day)]
    pub times_of_day: Vec<TimeOfDay>,
    #[arg(long, value_parser = parse_weather)]
    pub weather: Vec<Weather>,
    #[arg(long, value_parser = parse_setting)]
    pub setting: Option<Setting>,
    /// Idea ids already seen
    #[arg(long = "exclude")]
    pub exclude_ids: Vec<u32>,
}

impl From<SpinArgs> for SpinFilters {
    fn from(args: SpinArgs) -> Self {
        SpinFilters {
            min_minutes: args.min_minutes,
            max_minutes: args.max_minutes,
            costs: args.costs,
            categories: args.categories,
            times_of_day: args.times_of_day,
            weather: args.weather,
            setting: args.setting,
            exclude_ids: args.exclude_ids,
        }
    }
}

fn parse_with<T>(kind: &str, value: &str, parse: fn(&str) -> Option<T>) -> Result<T, String> {
    parse(value).ok_or_else(|| format!("unknown {} '{}'", kind, value))
}

fn parse_role(s: &str) -> Result<MemberRole, String> {
    parse_with("role", s, MemberRole::parse)
}

fn parse_status(s: &str) -> Result<MemberStatus, String> {
    parse_with("status", s, MemberStatus::parse)
}

fn parse_scope(s: &str) -> Result<IdeaScope, String> {
    parse_with("scope", s, IdeaScope::parse)
}

fn parse_cost(s: &str) -> Result<CostTier, String> {
    parse_with("cost", s, CostTier::parse)
}

fn parse_setting(s: &str) -> Result<Setting, String> {
    parse_with("setting", s, Setting::parse)
}

fn parse_time_of_day(s: &str) -> Result<TimeOfDay, String> {
    parse_with("time of day", s, TimeOfDay::parse)
}

fn parse_weather(s: &str) -> Result<Weather, String> {
    parse_with("weather", s, Weather::parse)
}

impl Cli {
    /// File config, then environment, then flags
    pub fn resolve_config(&self) -> Result<AppConfig, String> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = dir.clone();
        }
        Ok(config)
    }

    fn actor(&self) -> DomainResult<&str> {
        self.actor
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| DomainError::invalid_input("Pass --as <participant> or set DECISION_JAR_USER"))
    }
}

fn to_json<T: Serialize>(value: T) -> DomainResult<Value> {
    serde_json::to_value(value).map_err(|e| DomainError::internal(e.to_string()))
}

/// Run one parsed command against an open state
pub async fn execute(cli: &Cli, state: &AppState) -> DomainResult<Value> {
    if let Commands::Config = cli.command {
        return to_json(&state.config);
    }
    let actor = cli.actor()?;

    match &cli.command {
        Commands::Jar { command } => match command {
            JarCommands::Create { name, requires_approval } => {
                to_json(commands::create_jar(state, actor, name.clone(), *requires_approval).await?)
            }
            JarCommands::List => to_json(commands::list_jars(state, actor).await?),
            JarCommands::Show { jar } => to_json(commands::get_jar(state, actor, *jar).await?),
            JarCommands::Rename { jar, name } => to_json(commands::rename_jar(state, actor, *jar, name).await?),
            JarCommands::Approval { jar, enabled } => {
                to_json(commands::set_requires_approval(state, actor, *jar, *enabled).await?)
            }
            JarCommands::Delete { jar } => {
                commands::delete_jar(state, actor, *jar).await?;
                Ok(json!({ "deleted_jar": jar }))
            }
            JarCommands::Reset { jar } => {
                let removed = commands::reset_jar(state, actor, *jar).await?;
                Ok(json!({ "jar_id": jar, "removed": removed }))
            }
        },
        Commands::Member { command } => match command {
            MemberCommands::Add { jar, participant, role } => {
                to_json(commands::add_member(state, actor, *jar, participant, *role).await?)
            }
            MemberCommands::Join { jar } => to_json(commands::join_jar(state, actor, *jar).await?),
            MemberCommands::Status { jar, participant, status } => {
                to_json(commands::set_member_status(state, actor, *jar, participant, *status).await?)
            }
            MemberCommands::Role { jar, participant, role } => {
                to_json(commands::set_member_role(state, actor, *jar, participant, *role).await?)
            }
            MemberCommands::List { jar } => to_json(commands::list_members(state, actor, *jar).await?),
        },
        Commands::Idea { command } => match command {
            IdeaCommands::Add { jar, description, attributes } => {
                let draft = attributes.clone().into_draft(description.clone());
                to_json(commands::submit_idea(state, actor, *jar, draft).await?)
            }
            IdeaCommands::Update { idea, description, attributes } => {
                let draft = attributes.clone().into_draft(description.clone().unwrap_or_default());
                to_json(commands::update_idea(state, actor, *idea, draft).await?)
            }
            IdeaCommands::Approve { idea } => to_json(commands::approve_idea(state, actor, *idea).await?),
            IdeaCommands::Reject { idea } => to_json(commands::reject_idea(state, actor, *idea).await?),
            IdeaCommands::List { jar, scope } => to_json(commands::list_ideas(state, actor, *jar, *scope).await?),
            IdeaCommands::Show { idea } => to_json(commands::get_idea(state, actor, *idea).await?),
            IdeaCommands::Delete { ideas, jar } => match (jar, ideas.as_slice()) {
                (None, [single]) => {
                    commands::delete_idea(state, actor, *single).await?;
                    Ok(json!({ "removed": 1 }))
                }
                (None, _) => Err(DomainError::invalid_input("Deleting several ideas needs --jar")),
                (Some(jar), ids) => {
                    let removed = commands::bulk_delete_ideas(state, actor, *jar, ids).await?;
                    Ok(json!({ "jar_id": jar, "removed": removed }))
                }
            },
            IdeaCommands::Return { idea } => to_json(commands::return_idea_to_pool(state, actor, *idea).await?),
        },
        Commands::Allocate { jar, quota } => to_json(commands::allocate(state, actor, *jar, *quota).await?),
        Commands::Spin { jar, filters } => {
            let filters = SpinFilters::from(filters.clone());
            to_json(commands::spin(state, actor, *jar, &filters).await?)
        }
        Commands::Eligibility { jar } => to_json(commands::eligibility(state, actor, *jar).await?),
        Commands::Config => to_json(&state.config),
    }
}

/// Parse arguments, set up logging and storage, run the command
pub async fn run_with_args<I, T>(args: I) -> DomainResult<Value>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let config = cli.resolve_config().map_err(DomainError::invalid_input)?;

    if let Err(e) = rolling_logger::init_logger_with(config.log_dir.clone(), &config.app_name, config.logger_options()) {
        eprintln!("Logging disabled: {}", e);
    }

    let state = AppState::open(config).await.map_err(DomainError::internal)?;
    let result = execute(&cli, &state).await;
    state.db_state.close().await;
    result
}
