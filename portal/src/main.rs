//! `portal` command-line entry point: drives the session, navigation, and
//! participation services against the fixture collaborators.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use portal::domain::ports::{DEFAULT_ACTIVITY_LIMIT, Sleeper, TokioSleeper};
use portal::domain::{
    AuthService, CompetitionId, DisplayName, ParticipationService, ProfileEditor, ProfileUpdate,
    SessionStore, SlotBinding, TaskId, User, UserRole,
};
use portal::inbound::{header_links, Navigator};
use portal::outbound::fixtures::{
    FixtureCompetitionRepository, FixtureCredentialExchange, FixtureProfileService,
};
use portal::outbound::slot::FileSlot;
use portal::PortalSettings;

/// `portal` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "portal",
    about = "Sign in, browse competitions, and submit answers to the NADO portal",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in with an existing account.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Role to request if the account is enrolled on first login.
        #[arg(long)]
        role: Option<UserRole>,
    },
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: Option<UserRole>,
    },
    /// Sign out and forget the stored session.
    Logout,
    /// Show the current identity.
    Whoami,
    /// Inspect or edit the current profile.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Resolve a path as the portal's router would.
    Navigate { path: String },
    /// List competitions.
    Competitions {
        /// Only competitions accepting submissions.
        #[arg(long)]
        active: bool,
    },
    /// Show one competition and its tasks.
    Competition { id: String },
    /// Submit an answer to a task.
    ///
    /// Attempt limits are tracked per process, so each invocation starts
    /// with a full allowance.
    Submit {
        competition: String,
        task: String,
        answer: String,
    },
}

#[derive(Debug, Subcommand)]
enum ProfileAction {
    /// Identity, statistics, and recent activity.
    Show,
    /// Change display name, biography, or avatar.
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long = "avatar-url")]
        avatar_url: Option<String>,
    },
}

struct Portal {
    session: Arc<SessionStore>,
    auth: AuthService<FixtureCredentialExchange>,
    profiles: ProfileEditor<FixtureProfileService>,
    competitions: ParticipationService<FixtureCompetitionRepository>,
}

impl Portal {
    fn assemble(settings: &PortalSettings) -> Self {
        let session = Arc::new(open_session(settings));
        let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);
        let latency = settings.latency();

        let exchange = FixtureCredentialExchange::new(sleeper.clone())
            .with_latency(latency)
            .with_open_enrolment(settings.open_enrolment);
        let profiles = FixtureProfileService::new(Arc::new(DefaultClock), sleeper.clone())
            .with_latency(latency);
        let repository = FixtureCompetitionRepository::new(Arc::new(DefaultClock), sleeper)
            .with_latency(latency);

        Self {
            auth: AuthService::new(Arc::new(exchange), session.clone()),
            profiles: ProfileEditor::new(Arc::new(profiles), session.clone()),
            competitions: ParticipationService::new(Arc::new(repository), session.clone()),
            session,
        }
    }
}

fn open_session(settings: &PortalSettings) -> SessionStore {
    if settings.headless {
        return SessionStore::headless();
    }
    let dir = settings.slot_dir();
    match FileSlot::open(&dir) {
        Ok(slot) => {
            SessionStore::restore(SlotBinding::new(Arc::new(slot)).with_key(settings.slot_key()))
        }
        Err(error) => {
            warn!(path = %dir.display(), %error, "session slot unavailable; running headless");
            SessionStore::headless()
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = PortalSettings::load_from_iter([OsString::from("portal")])
        .wrap_err("failed to load portal settings")?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build portal runtime")?;
    runtime.block_on(run(cli.command, &settings))
}

async fn run(command: Command, settings: &PortalSettings) -> Result<()> {
    let portal = Portal::assemble(settings);
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let mut out = io::stdout().lock();
    match command {
        Command::Login {
            email,
            password,
            role,
        } => {
            let signed_in = portal.auth.login(&email, &password, role, &cancel).await?;
            print_identity(&mut out, &signed_in.user)?;
            writeln!(out, "next: {}", signed_in.landing)?;
        }
        Command::Register {
            email,
            password,
            name,
            role,
        } => {
            let registered = portal
                .auth
                .register(&email, &password, &name, role, &cancel)
                .await?;
            print_identity(&mut out, &registered.user)?;
            writeln!(out, "next: {}", registered.landing)?;
        }
        Command::Logout => {
            let landing = portal.auth.logout();
            writeln!(out, "signed out")?;
            writeln!(out, "next: {landing}")?;
        }
        Command::Whoami => match portal.session.current() {
            Some(user) => print_identity(&mut out, &user)?,
            None => writeln!(out, "not signed in")?,
        },
        Command::Profile { action } => profile(&mut out, &portal, action, &cancel).await?,
        Command::Navigate { path } => {
            let mut navigator = Navigator::new(portal.session.clone());
            let outcome = navigator.navigate(&path);
            for hop in &outcome.redirects {
                writeln!(out, "redirect: {hop}")?;
            }
            writeln!(out, "landed: {} ({})", outcome.landed, outcome.landed.title())?;
            let links: Vec<String> = header_links(portal.session.current_role())
                .iter()
                .map(|region| region.path())
                .collect();
            writeln!(out, "header: {}", links.join(" "))?;
        }
        Command::Competitions { active } => {
            let list = if active {
                portal.competitions.active().await?
            } else {
                portal.competitions.list().await?
            };
            for competition in list {
                writeln!(
                    out,
                    "{:>3}  {:<9} {}  (until {})",
                    competition.id,
                    competition.status.label(),
                    competition.title,
                    competition.deadline_at.format("%Y-%m-%d"),
                )?;
            }
        }
        Command::Competition { id } => {
            let id = CompetitionId::new(id)?;
            let details = portal.competitions.details(&id).await?;
            writeln!(out, "{} [{}]", details.summary.title, details.summary.status.label())?;
            writeln!(out, "{}", details.description)?;
            writeln!(out, "rules: {}", details.rules)?;
            for task in &details.tasks {
                writeln!(
                    out,
                    "  {}  {} ({}, max {} attempts)",
                    task.id,
                    task.title,
                    task.submission_type.label(),
                    task.max_attempts
                )?;
            }
        }
        Command::Submit {
            competition,
            task,
            answer,
        } => {
            let competition = CompetitionId::new(competition)?;
            let task = TaskId::new(task)?;
            let submission = portal
                .competitions
                .submit(&competition, &task, &answer, &cancel)
                .await?;
            let score = submission
                .score
                .map_or_else(|| "pending".to_owned(), |score| score.to_string());
            writeln!(out, "submission {} scored {score}", submission.id)?;
        }
    }
    Ok(())
}

async fn profile(
    out: &mut impl Write,
    portal: &Portal,
    action: ProfileAction,
    cancel: &CancellationToken,
) -> Result<()> {
    match action {
        ProfileAction::Show => {
            let stats = portal.profiles.stats().await?;
            let activity = portal.profiles.recent_activity(DEFAULT_ACTIVITY_LIMIT).await?;
            if let Some(user) = portal.session.current() {
                print_identity(out, &user)?;
            }
            writeln!(
                out,
                "competitions: {}  submissions: {}  best score: {}  rank: {}",
                stats.competitions_count,
                stats.submissions_count,
                stats.best_score.map_or_else(|| "-".to_owned(), |s| s.to_string()),
                stats.rank.map_or_else(|| "-".to_owned(), |r| r.to_string()),
            )?;
            for entry in activity {
                writeln!(
                    out,
                    "  {}  {}: {}",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.title,
                    entry.description
                )?;
            }
        }
        ProfileAction::Update {
            name,
            bio,
            avatar_url,
        } => {
            let mut patch = ProfileUpdate::default();
            if let Some(name) = name {
                patch = patch.with_name(DisplayName::new(name.trim())?);
            }
            if let Some(bio) = bio {
                patch = patch.with_bio(bio);
            }
            if let Some(avatar_url) = avatar_url {
                patch = patch.with_avatar_url(avatar_url);
            }
            let updated = portal.profiles.save(&patch, cancel).await?;
            print_identity(out, &updated)?;
        }
    }
    Ok(())
}

fn print_identity(out: &mut impl Write, user: &User) -> io::Result<()> {
    writeln!(out, "[{}] {} <{}>", user.initial(), user.name(), user.email())?;
    writeln!(out, "id: {}  role: {}", user.id(), user.role().label())?;
    if let Some(bio) = user.bio() {
        writeln!(out, "bio: {bio}")?;
    }
    if let Some(avatar_url) = user.avatar_url() {
        writeln!(out, "avatar: {avatar_url}")?;
    }
    Ok(())
}
