use crate::event::{Button, ChatEvent, Reply};
use crate::format;
use chrono::{Local, NaiveDate};
use hawker_query::{
    ClosureEvaluator, ClosureReport, NameMatcher, ProximityRanker, QueryError, QueryWindow,
    Result,
};
use hawker_types::Snapshot;
use std::collections::HashMap;
use std::sync::Arc;

/// Station-picker conversation state, kept per chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerState {
    AwaitFirstLetter,
    AwaitStation,
}

/// Routes inbound chat events to the query engine and builds replies.
/// Handlers borrow the current snapshot; a refresh swaps in a complete
/// replacement via [`Dispatcher::set_snapshot`].
pub struct Dispatcher {
    snapshot: Arc<Snapshot>,
    matcher: NameMatcher,
    ranker: ProximityRanker,
    picker: HashMap<i64, PickerState>,
}

impl Dispatcher {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self {
            snapshot,
            matcher: NameMatcher::new(),
            ranker: ProximityRanker::new(),
            picker: HashMap::new(),
        }
    }

    /// Swap in a freshly built snapshot. In-flight picker conversations
    /// keep their state; the next event sees the new tables.
    pub fn set_snapshot(&mut self, snapshot: Arc<Snapshot>) {
        self.snapshot = snapshot;
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Handle one event against the current local calendar day.
    pub fn handle(&mut self, event: &ChatEvent) -> Reply {
        self.handle_on(event, Local::now().date_naive())
    }

    /// Handle one event with an explicit "today". Errors never escape:
    /// anything a handler fails on becomes the fallback message.
    pub fn handle_on(&mut self, event: &ChatEvent, today: NaiveDate) -> Reply {
        log_event(event);
        match self.try_handle(event, today) {
            Ok(reply) => reply,
            Err(err) => {
                log::warn!("Handler error for chat {}: {err}", event.chat_id());
                Reply::text(format::unknown())
            }
        }
    }

    fn try_handle(&mut self, event: &ChatEvent, today: NaiveDate) -> Result<Reply> {
        match event {
            ChatEvent::Command {
                chat_id,
                from,
                text,
            } => self.command(*chat_id, from, text, today),
            // Free text gets the greeting, like /start.
            ChatEvent::Text { from, .. } => Ok(Reply::text(format::greeting(from))),
            ChatEvent::Location {
                latitude,
                longitude,
                ..
            } => Ok(self.nearest_to_location(*latitude, *longitude, today)),
            ChatEvent::Callback { chat_id, data, .. } => self.callback(*chat_id, data, today),
            ChatEvent::Sticker { emoji, .. } => Ok(Reply::text(emoji.clone())),
        }
    }

    fn command(
        &mut self,
        chat_id: i64,
        from: &str,
        text: &str,
        today: NaiveDate,
    ) -> Result<Reply> {
        let trimmed = text.trim();
        let mut parts = trimmed.split_whitespace();
        match parts.next().unwrap_or("") {
            "/start" => Ok(Reply::text(format::greeting(from))),
            "/info" => Ok(Reply::text(format::info(from))),
            "/closed" => {
                let window = match parts.next() {
                    Some("this-week") => QueryWindow::this_week(today),
                    Some("next-week") => QueryWindow::next_week(today),
                    _ => QueryWindow::day(today),
                };
                let report = ClosureEvaluator::evaluate(&self.snapshot, window);
                Ok(Reply::text(format::closed_list(window, &report)))
            }
            "/search" => {
                // Query as typed, case-sensitive.
                let query = trimmed.strip_prefix("/search").unwrap_or("").trim();
                self.search_by_name(query, today)
            }
            "/mrt" => Ok(self.enter_picker(chat_id)),
            "/nearest" => Ok(Reply::text(format::nearest_prompt())),
            _ => Ok(Reply::text(format::unknown())),
        }
    }

    fn today_report(&self, today: NaiveDate) -> ClosureReport {
        ClosureEvaluator::evaluate(&self.snapshot, QueryWindow::day(today))
    }

    fn search_by_name(&self, query: &str, today: NaiveDate) -> Result<Reply> {
        let matches = self.matcher.search(&self.snapshot, query)?;
        let report = self.today_report(today);
        let markers = format::shuffled_markers();
        Ok(Reply::text(format::name_results(
            &self.snapshot,
            query,
            &matches,
            &report,
            &markers,
        )))
    }

    fn nearest_to_location(&self, latitude: f64, longitude: f64, today: NaiveDate) -> Reply {
        let matches = self.ranker.nearest(&self.snapshot, latitude, longitude);
        let report = self.today_report(today);
        let markers = format::shuffled_markers();
        Reply::text(format::location_results(
            &self.snapshot,
            &matches,
            &report,
            &markers,
        ))
    }

    /// `/mrt` (re-)enters the picker: one button per distinct initial
    /// letter of the cleaned station names, sorted.
    fn enter_picker(&mut self, chat_id: i64) -> Reply {
        let mut letters: Vec<char> = self
            .snapshot
            .stations()
            .iter()
            .filter_map(|station| station.cleaned.chars().next())
            .collect();
        letters.sort_unstable();
        letters.dedup();

        let keyboard = letters
            .iter()
            .map(|letter| {
                vec![Button::new(
                    letter.to_uppercase().to_string(),
                    letter.to_string(),
                )]
            })
            .collect();

        self.picker.insert(chat_id, PickerState::AwaitFirstLetter);
        Reply::with_keyboard(format::first_letter_prompt(), keyboard)
    }

    fn callback(&mut self, chat_id: i64, data: &str, today: NaiveDate) -> Result<Reply> {
        match self.picker.get(&chat_id) {
            Some(PickerState::AwaitFirstLetter) => self.pick_letter(chat_id, data),
            Some(PickerState::AwaitStation) => self.pick_station(chat_id, data, today),
            // A button press outside any conversation.
            None => Ok(Reply::text(format::unknown())),
        }
    }

    /// First transition: narrow to stations whose cleaned name starts with
    /// the selected letter, labelled `Title Case (CODE)`.
    fn pick_letter(&mut self, chat_id: i64, data: &str) -> Result<Reply> {
        let Some(letter) = data.chars().next() else {
            return Ok(Reply::text(format::unknown()));
        };

        let keyboard: Vec<Vec<Button>> = self
            .snapshot
            .stations()
            .iter()
            .filter(|station| station.cleaned.starts_with(letter))
            .map(|station| {
                vec![Button::new(
                    format!("{} ({})", format::title_case(&station.cleaned), station.code),
                    station.code.clone(),
                )]
            })
            .collect();

        if keyboard.is_empty() {
            self.picker.remove(&chat_id);
            return Ok(Reply::text(format::unknown()));
        }

        self.picker.insert(chat_id, PickerState::AwaitStation);
        Ok(Reply::with_keyboard(format::station_prompt(letter), keyboard))
    }

    /// Second transition: rank the venues linked to the selected station
    /// and end the conversation.
    fn pick_station(&mut self, chat_id: i64, code: &str, today: NaiveDate) -> Result<Reply> {
        let Some(station) = self.snapshot.station(code).cloned() else {
            return Err(QueryError::UnknownStation(code.to_string()));
        };
        let matches = self.ranker.nearest_to_station(&self.snapshot, code)?;
        self.picker.remove(&chat_id);

        let report = self.today_report(today);
        let markers = format::shuffled_markers();
        Ok(Reply::text(format::station_results(
            &self.snapshot,
            &station,
            &matches,
            &report,
            &markers,
        )))
    }
}

/// Log who sent what. Command text is truncated to 255 characters;
/// locations log their coordinates.
fn log_event(event: &ChatEvent) {
    let from = event.from_user();
    let chat_id = event.chat_id();
    match event {
        ChatEvent::Location {
            latitude,
            longitude,
            ..
        } => {
            log::info!("{from} ({chat_id}) sent a location: {latitude}, {longitude}.");
        }
        ChatEvent::Command { text, .. } | ChatEvent::Text { text, .. } => {
            let text: String = text.chars().take(255).collect();
            log::info!("{from} ({chat_id}) sent {text}.");
        }
        ChatEvent::Callback { data, .. } => {
            log::info!("{from} ({chat_id}) pressed {data}.");
        }
        ChatEvent::Sticker { emoji, .. } => {
            log::info!("{from} ({chat_id}) sent a sticker: {emoji}.");
        }
    }
}
