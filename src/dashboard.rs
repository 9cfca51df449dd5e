use console::{style, StyledObject};
use rust_decimal::Decimal;

use crate::config::Config;
use crate::format::{
    format_chf, format_range, format_timestamp, last_sync_label, live_mode_label, status_label,
    status_tone, Tone,
};
use crate::model::{DayRecord, Freshness, IMPORT_YEAR};
use crate::sync::Snapshot;
use crate::terminal::{BulletPointPrinter, LineWriter};

const TITLE: &str = "La Profumoteca Sync";
const NO_OPEN_DAYS: &str = "Keine offenen Tage. Alles sauber übertragen.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SendToday,
    ResendDay,
    IgnoreDay,
    ToggleLiveMode,
    RunCollection,
    SendToLedger,
    SelectDay,
    Reload,
    Quit,
}

impl Action {
    pub fn label(self) -> String {
        match self {
            Action::SendToday => "Tagesabschluss an Klara senden".to_string(),
            Action::ResendDay => "Offenen Tag erneut senden".to_string(),
            Action::IgnoreDay => "Offenen Tag ignorieren".to_string(),
            Action::ToggleLiveMode => "Live-Modus umschalten".to_string(),
            Action::RunCollection => "Daten aus Shopify einsammeln".to_string(),
            Action::SendToLedger => format!("Buchungen {IMPORT_YEAR} an Klara senden"),
            Action::SelectDay => "Anderen Tag wählen".to_string(),
            Action::Reload => "Neu laden".to_string(),
            Action::Quit => "Beenden".to_string(),
        }
    }
}

/// What the user can do given the current state
pub fn available_actions(snapshot: &Snapshot) -> Vec<Action> {
    let mut actions = vec![];
    if let Some(day) = &snapshot.selected {
        if !day.is_sent() && snapshot.selected_date == Some(day.date()) {
            actions.push(Action::SendToday);
        }
    }
    if !snapshot.backlog.is_empty() {
        actions.push(Action::ResendDay);
        actions.push(Action::IgnoreDay);
    }
    actions.push(Action::ToggleLiveMode);
    actions.push(Action::RunCollection);
    if snapshot.import.has_run {
        actions.push(Action::SendToLedger);
    }
    actions.extend([Action::SelectDay, Action::Reload, Action::Quit]);
    actions
}

pub fn render_dashboard<W: LineWriter + Clone>(
    printer: &BulletPointPrinter<W>,
    snapshot: &Snapshot,
    config: &Config,
) {
    printer.print_line(format_args!(
        "{}  {}",
        style_header(TITLE),
        style("Shopify → Klara").dim()
    ));
    printer.print_line(style("Automatischer Abgleich von Online-Umsatz und Gutscheinen.").dim());
    printer.print_line("");
    render_today(printer, snapshot, config);
    printer.print_line("");
    render_live_mode(printer, snapshot);
    printer.print_line("");
    render_open_days(printer, snapshot);
    printer.print_line("");
    render_import(printer, snapshot);
    printer.print_line("");
    render_settings(printer, config);
}

fn render_today<W: LineWriter + Clone>(
    printer: &BulletPointPrinter<W>,
    snapshot: &Snapshot,
    config: &Config,
) {
    printer.print_line(format_args!(
        "{} {}",
        style_header("Heute"),
        freshness_note(&snapshot.day_freshness)
    ));
    let printer = printer.indent();
    let Some(day) = &snapshot.selected else {
        match snapshot.selected_date {
            Some(date) => printer.print_line(format_args!("{date}: keine Daten")),
            None => printer.print_line(style("Kein Tag gewählt").italic()),
        }
        return;
    };
    if let Some(selected_date) = snapshot.selected_date {
        if selected_date != day.date() {
            printer.print_line(
                style(format!("Gewählt: {selected_date}, angezeigt: {}", day.date())).yellow(),
            );
        }
    }
    printer.print_line(format_args!(
        "{}  {}",
        style(day.date()).bold(),
        style_status(day)
    ));
    print_amount(&printer, "Umsatz brutto", day.gross_revenue());
    print_amount(
        &printer,
        &format!("MWST {}%", config.vat_rate.normalize()),
        day.tax(),
    );
    print_amount(&printer, "Gutscheine verkauft", day.voucher_revenue());
    printer.print_line(format_args!(
        "Letzter Sync: {}",
        last_sync_label(day.last_sync_time())
    ));
    if !day.is_sent() {
        printer.print_line(style(format!("→ {}", Action::SendToday.label())).cyan());
    }
}

fn print_amount<W: LineWriter + Clone>(
    printer: &BulletPointPrinter<W>,
    label: &str,
    amount: Decimal,
) {
    printer.print_line(format_args!(
        "{:<22}{}",
        format!("{label}:"),
        style(format_chf(amount)).bold()
    ));
}

fn render_live_mode<W: LineWriter + Clone>(printer: &BulletPointPrinter<W>, snapshot: &Snapshot) {
    printer.print_line(format_args!(
        "{} {}",
        style_header("Live-Modus"),
        freshness_note(&snapshot.live_mode_freshness)
    ));
    let printer = printer.indent();
    printer.print_line(style("Neue Shopify-Bestellungen automatisch sammeln.").dim());
    let label = style(live_mode_label(snapshot.live_mode)).bold();
    printer.print_line(format_args!(
        "Status: {}",
        if snapshot.live_mode {
            label.green()
        } else {
            label.dim()
        }
    ));
}

fn render_open_days<W: LineWriter + Clone>(printer: &BulletPointPrinter<W>, snapshot: &Snapshot) {
    printer.print_line(format_args!(
        "{} {}",
        style_header("Offene Tage"),
        freshness_note(&snapshot.backlog_freshness)
    ));
    let printer = printer.indent();
    if snapshot.backlog.is_empty() {
        printer.print_line(style(NO_OPEN_DAYS).italic());
        return;
    }
    for day in snapshot.backlog.iter() {
        printer.print_item(format_args!(
            "{}  {}",
            day.date,
            style_tone(status_label(day.status), status_tone(day.status))
        ));
    }
}

fn render_import<W: LineWriter + Clone>(printer: &BulletPointPrinter<W>, snapshot: &Snapshot) {
    let import = &snapshot.import;
    printer.print_line(format_args!(
        "{} {}",
        style_header(&format!("Rückwirkender Import {IMPORT_YEAR}")),
        freshness_note(&snapshot.import_freshness)
    ));
    let printer = printer.indent();
    printer.print_line(format_args!(
        "Zeitraum: {}",
        style(format_range(&import.range)).bold()
    ));
    if !import.has_run {
        return;
    }
    printer.print_line(format_args!("Tage insgesamt: {}", import.counts.days_total));
    printer.print_line(format_args!(
        "Tage mit Umsatz: {}",
        import.counts.days_with_revenue
    ));
    printer.print_line(format_args!(
        "Tage ohne Umsatz: {}",
        import.counts.days_without_revenue
    ));
    if let Some(last_run_at) = import.last_run_at {
        printer.print_line(format_args!(
            "Letzter Importlauf: {}",
            format_timestamp(last_run_at)
        ));
    }
    if let Some(last_sent_at) = import.last_sent_at {
        printer.print_line(format_args!(
            "Zuletzt an Klara gesendet: {}",
            format_timestamp(last_sent_at)
        ));
    }
}

pub fn render_settings<W: LineWriter + Clone>(printer: &BulletPointPrinter<W>, config: &Config) {
    let accounts = &config.ledger_accounts;
    printer.print_line(style_header("Einstellungen / Info"));
    let printer = printer.indent();
    printer.print_line("Verbundene Konten:");
    let printer = printer.indent();
    printer.print_item(format_args!("Umsatzkonto: {}", accounts.revenue));
    printer.print_item(format_args!(
        "MWST {}%: {}",
        config.vat_rate.normalize(),
        accounts.vat
    ));
    printer.print_item(format_args!(
        "Gutscheinverbindlichkeiten: {}",
        accounts.voucher_liabilities
    ));
    printer.print_item(format_args!(
        "Forderungen Karten / Online: {}",
        accounts.card_receivables
    ));
    printer.print_line(
        style(
            "Zahlungseingänge und Gebühren werden weiterhin direkt in Klara über den \
             Kontoabgleich erfasst.",
        )
        .dim(),
    );
}

fn freshness_note(freshness: &Freshness) -> StyledObject<String> {
    match freshness {
        Freshness::Fresh => style(String::new()),
        Freshness::InFlight => style("(wird aktualisiert …)".to_string()).dim(),
        Freshness::StaleAfterError(err) => style(format!("(veraltet: {err})")).red(),
    }
}

fn style_header(header: &str) -> StyledObject<&str> {
    style(header).bold().underlined()
}

fn style_status(day: &DayRecord) -> StyledObject<&'static str> {
    style_tone(status_label(day.status()), status_tone(day.status()))
}

fn style_tone(label: &'static str, tone: Tone) -> StyledObject<&'static str> {
    let styled = style(label);
    match tone {
        Tone::Success => styled.green(),
        Tone::Pending => styled.yellow(),
        Tone::Failure => styled.red(),
        Tone::Neutral => styled.dim(),
    }
}
