use anyhow::Result;
use chrono::{Local, NaiveDate};
use console::style;

use crate::args::{Args, Command};
use crate::config::Config;
use crate::dashboard::{available_actions, render_dashboard, render_settings, Action};
use crate::model::{parse_date, IMPORT_YEAR};
use crate::service_api::{SyncBackend, SyncService};
use crate::sync::{Orchestrator, Outcome};
use crate::terminal::{self, with_spinner, BulletPointPrinter, StdoutLineWriter};

pub async fn main(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())
        .await?
        .with_env_overrides();
    config.validate()?;
    let service = SyncService::new(&config.api_base_url, config.request_timeout())?;
    let cli = Cli::new(config, service);

    match args.command.unwrap_or(Command::Dashboard { date: None }) {
        Command::Dashboard { date } => cli.main_dashboard(date.unwrap_or_else(today)).await?,
        Command::Show { date } => cli.main_show(date.unwrap_or_else(today)).await,
        Command::Send { date } => cli.main_send(date).await,
        Command::Resend { date } => cli.main_resend(date).await,
        Command::Import { send } => cli.main_import(send).await,
        Command::Info => cli.main_info(),
    }
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct Cli<B: SyncBackend> {
    config: Config,
    orchestrator: Orchestrator<B>,
    printer: BulletPointPrinter<StdoutLineWriter>,
}

impl<B: SyncBackend> Cli<B> {
    pub fn new(config: Config, backend: B) -> Self {
        let orchestrator = Orchestrator::new(
            backend,
            config.request_timeout(),
            config.live_mode_on_start,
        );
        Self {
            config,
            orchestrator,
            printer: BulletPointPrinter::new_stdout(),
        }
    }

    pub async fn main_dashboard(&self, date: NaiveDate) -> Result<()> {
        self.select(date).await;
        loop {
            let snapshot = self.orchestrator.snapshot();
            println!();
            render_dashboard(&self.printer, &snapshot, &self.config);
            println!();

            let actions = available_actions(&snapshot);
            let labels: Vec<String> = actions.iter().map(|action| action.label()).collect();
            let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
            let choice = terminal::prompt_select("Aktion", &labels, 0)?;
            match actions[choice] {
                Action::SendToday => {
                    let outcome =
                        with_spinner("Sende an Klara …", self.orchestrator.send_today()).await;
                    self.report(&outcome, "Tagesabschluss gesendet");
                }
                Action::ResendDay => {
                    if let Some(date) = self.prompt_open_day("Welchen Tag erneut senden?")? {
                        let outcome = with_spinner(
                            "Sende an Klara …",
                            self.orchestrator.resend_day(date),
                        )
                        .await;
                        self.report(&outcome, &format!("{date} erneut gesendet"));
                    }
                }
                Action::IgnoreDay => {
                    if let Some(date) = self.prompt_open_day("Welchen Tag ignorieren?")? {
                        let confirmed = terminal::prompt_yes_no(&format!(
                            "{date} nicht mehr verfolgen? Die Abweichung wird akzeptiert."
                        ))?;
                        if confirmed {
                            let outcome = self.orchestrator.ignore_day(date);
                            self.report(&outcome, &format!("{date} ignoriert"));
                        }
                    }
                }
                Action::ToggleLiveMode => {
                    let outcome = with_spinner(
                        "Live-Modus wird umgeschaltet …",
                        self.orchestrator.toggle_live_mode(),
                    )
                    .await;
                    self.report(&outcome, "Live-Modus umgeschaltet");
                }
                Action::RunCollection => self.collect().await,
                Action::SendToLedger => self.send_postings().await,
                Action::SelectDay => {
                    let input = terminal::prompt("Tag (YYYY-MM-DD)")?;
                    match parse_date(input.trim()) {
                        Ok(date) => {
                            self.select(date).await;
                        }
                        Err(err) => self.printer.print_line(style(format!("{err:#}")).red()),
                    }
                }
                Action::Reload => {
                    let date = self.orchestrator.snapshot().selected_date.unwrap_or_else(today);
                    self.select(date).await;
                }
                Action::Quit => break,
            }
        }
        Ok(())
    }

    pub async fn main_show(&self, date: NaiveDate) {
        self.select(date).await;
        render_dashboard(&self.printer, &self.orchestrator.snapshot(), &self.config);
    }

    pub async fn main_send(&self, date: NaiveDate) {
        if !self.select(date).await {
            return;
        }
        let outcome = with_spinner("Sende an Klara …", self.orchestrator.send_today()).await;
        self.report(&outcome, &format!("{date} an Klara gesendet"));
    }

    pub async fn main_resend(&self, date: NaiveDate) {
        let outcome = with_spinner(
            "Offene Tage werden geladen …",
            self.orchestrator.refresh_backlog(),
        )
        .await;
        if !outcome.is_applied() {
            self.report(&outcome, "");
            return;
        }
        let outcome = with_spinner("Sende an Klara …", self.orchestrator.resend_day(date)).await;
        self.report(&outcome, &format!("{date} erneut gesendet"));
    }

    pub async fn main_import(&self, send: bool) {
        self.collect().await;
        if send && self.orchestrator.import_status().has_run {
            self.send_postings().await;
        }
    }

    pub fn main_info(&self) {
        render_settings(&self.printer, &self.config);
    }

    /// Load `date` and report failures, returns whether it is now displayed
    async fn select(&self, date: NaiveDate) -> bool {
        let outcome = with_spinner(
            &format!("{date} wird geladen …"),
            self.orchestrator.select_day(date),
        )
        .await;
        if outcome.error().is_some() {
            self.report(&outcome, "");
        }
        outcome.is_applied()
    }

    async fn collect(&self) {
        let outcome = with_spinner(
            &format!("Bestellungen {IMPORT_YEAR} werden eingesammelt …"),
            self.orchestrator.run_collection(),
        )
        .await;
        let counts = self.orchestrator.import_status().counts;
        self.report(
            &outcome,
            &format!(
                "{} Tage eingesammelt, {} mit Umsatz, {} ohne Umsatz",
                counts.days_total, counts.days_with_revenue, counts.days_without_revenue
            ),
        );
    }

    async fn send_postings(&self) {
        let outcome = with_spinner(
            &format!("Buchungen {IMPORT_YEAR} werden gesendet …"),
            self.orchestrator.send_to_ledger(),
        )
        .await;
        self.report(&outcome, &format!("Buchungen {IMPORT_YEAR} an Klara gesendet"));
    }

    fn prompt_open_day(&self, prompt: &str) -> Result<Option<NaiveDate>> {
        let dates: Vec<NaiveDate> = self.orchestrator.backlog().dates().collect();
        if dates.is_empty() {
            return Ok(None);
        }
        let labels: Vec<String> = dates.iter().map(NaiveDate::to_string).collect();
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        let choice = terminal::prompt_select(prompt, &labels, 0)?;
        Ok(Some(dates[choice]))
    }

    fn report(&self, outcome: &Outcome, success: &str) {
        match outcome {
            Outcome::Applied => self.printer.print_line(style(format!("✓ {success}")).green()),
            Outcome::Superseded => {}
            Outcome::Failed(err) => self.printer.print_line(style(format!("✗ {err}")).red()),
        }
    }
}
