use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "usagers")]
#[command(about = "Household eligibility rules and case journal for the housing office")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    pub config: String,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// Output format: table or json (overrides configuration)
    #[arg(short, long, global = true)]
    pub format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Canonicalize a household role label
    Role {
        /// Free-text role, e.g. "Enfant (DV)"
        label: String,
    },

    /// Age in completed years of a birth date
    Age {
        /// Birth date (YYYY-MM-DD)
        birth_date: String,
    },

    /// Check a residence permit
    Permit {
        #[arg(short, long)]
        nationality: Option<String>,

        /// Permit kind, e.g. "Permis B"
        #[arg(short, long)]
        permit: Option<String>,

        /// Permit expiry date (YYYY-MM-DD)
        #[arg(short, long)]
        expiry: Option<String>,
    },

    /// Assess a household described in a JSON file
    Household {
        /// Path to the household JSON
        file: String,

        /// Show the reason behind each member's outcome
        #[arg(short, long)]
        verbose: bool,
    },

    /// Manage an applicant's journal tasks
    Journal {
        #[command(subcommand)]
        action: JournalAction,
    },

    /// Manage an applicant's interactions
    Interaction {
        #[command(subcommand)]
        action: InteractionAction,
    },

    /// Show record counts
    Stats,

    /// Initialize database and configuration
    Init,
}

#[derive(Subcommand)]
pub enum JournalAction {
    /// Add a task, or replace the task with the same id
    Add {
        /// Applicant id
        #[arg(short, long)]
        owner: String,

        #[arg(short, long)]
        title: String,

        /// Task id (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<String>,

        /// low, normal, high or urgent
        #[arg(short, long)]
        priority: Option<String>,

        /// Free tags, repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// List tasks, of one applicant or of everyone
    List {
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Mark a task as in progress
    Start {
        id: String,
    },

    /// Mark a task as done
    Done {
        id: String,
    },

    /// Remove a task
    Remove {
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum InteractionAction {
    /// Record an interaction
    Add {
        /// Applicant id
        #[arg(short, long)]
        owner: String,

        /// appel, email, entretien, visite, courrier or note
        #[arg(short, long)]
        kind: String,

        #[arg(short, long)]
        summary: String,

        /// Interaction id (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Free tags, repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// List interactions of an applicant
    List {
        #[arg(short, long)]
        owner: String,
    },

    /// Remove an interaction
    Remove {
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
