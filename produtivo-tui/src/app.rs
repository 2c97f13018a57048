//! Application state and event handling.
//!
//! This module implements the Elm Architecture pattern for state management,
//! with a centralized App struct holding all application state. Key handlers
//! return the `ApiCommand` (if any) the event loop should forward to the
//! worker.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use uuid::Uuid;

use crate::api::{ApiCommand, ApiMessage, EntityType};
use crate::forms::{ActiveForm, FeatureWizard, FormField, ProductForm};
use crate::models::{FeatureDto, ProductDto};
use crate::roadmap::RoadmapLayout;
use crate::timeline::TimelineState;

/// Active tab in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    Products,
    /// Roadmap view (default)
    #[default]
    Roadmap,
    Features,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Products, Tab::Roadmap, Tab::Features]
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Products => Tab::Roadmap,
            Tab::Roadmap => Tab::Features,
            Tab::Features => Tab::Products,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Tab::Products => Tab::Features,
            Tab::Roadmap => Tab::Products,
            Tab::Features => Tab::Roadmap,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tab::Products => "Products",
            Tab::Roadmap => "Roadmap",
            Tab::Features => "Features",
        }
    }
}

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Editing a form field
    Editing,
    /// Confirmation dialog (delete)
    Confirming,
}

/// Confirmation dialog state
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    /// Whether "Yes" is focused (false = "No" is focused)
    pub yes_focused: bool,
}

impl ConfirmDialog {
    pub fn new_delete(entity_type: EntityType, entity_id: Uuid, name: &str) -> Self {
        let warning = match entity_type {
            EntityType::Product => "Its features are deleted with it.",
            EntityType::Feature => "This action cannot be undone.",
        };
        Self {
            title: format!("Delete {}", entity_type),
            message: format!("Are you sure you want to delete \"{}\"?\n{}", name, warning),
            entity_type,
            entity_id,
            yes_focused: false,
        }
    }

    fn command(&self) -> ApiCommand {
        match self.entity_type {
            EntityType::Product => ApiCommand::DeleteProduct(self.entity_id),
            EntityType::Feature => ApiCommand::DeleteFeature(self.entity_id),
        }
    }
}

/// Error popup state
#[derive(Debug, Clone)]
pub struct ErrorPopup {
    pub title: String,
    pub message: String,
    /// When the error was shown
    pub shown_at: Instant,
    /// Auto-dismiss duration (None for manual dismiss)
    pub auto_dismiss: Option<Duration>,
}

impl ErrorPopup {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            shown_at: Instant::now(),
            auto_dismiss: Some(Duration::from_secs(5)),
        }
    }

    pub fn should_dismiss(&self) -> bool {
        self.auto_dismiss
            .is_some_and(|duration| self.shown_at.elapsed() > duration)
    }
}

/// Log entry for the message area
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Local>,
    pub message: String,
    pub level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogEntry {
    fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Local::now(),
            message: message.into(),
            level,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }
}

fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Main application state
#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub active_tab: Tab,
    pub input_mode: InputMode,

    pub products: Vec<ProductDto>,
    /// Every feature, across products
    pub features: Vec<FeatureDto>,
    /// Product the roadmap and feature list are scoped to
    pub selected_product: Option<Uuid>,
    /// Features of the scoped product (all when unscoped)
    scoped_features: Vec<FeatureDto>,

    /// Roadmap navigation state
    pub timeline_state: TimelineState,
    /// Feature shown in the details overlay
    pub feature_details: Option<Uuid>,

    pub error_popup: Option<ErrorPopup>,
    pub form: Option<ActiveForm>,
    pub confirm_dialog: Option<ConfirmDialog>,

    /// Log messages
    pub logs: Vec<LogEntry>,
    max_logs: usize,

    /// Selected row in the products list
    pub product_selected: usize,
    /// Selected row in the features list
    pub feature_selected: usize,

    pub api_connected: bool,
    pub last_refresh: Option<Instant>,
    pub is_loading: bool,
    pub show_help: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new(TimelineState::default())
    }
}

impl App {
    pub fn new(timeline_state: TimelineState) -> Self {
        let mut app = Self {
            should_quit: false,
            active_tab: Tab::Roadmap,
            input_mode: InputMode::Normal,
            products: Vec::new(),
            features: Vec::new(),
            selected_product: None,
            scoped_features: Vec::new(),
            timeline_state,
            feature_details: None,
            error_popup: None,
            form: None,
            confirm_dialog: None,
            logs: Vec::new(),
            max_logs: 100,
            product_selected: 0,
            feature_selected: 0,
            api_connected: false,
            last_refresh: None,
            is_loading: true,
            show_help: false,
        };

        app.log(LogEntry::info("Produtivo initialized"));
        app.log(LogEntry::info("Connecting to API..."));
        app
    }

    pub fn log(&mut self, entry: LogEntry) {
        match entry.level {
            LogLevel::Error => tracing::error!("{}", entry.message),
            LogLevel::Warning => tracing::warn!("{}", entry.message),
            LogLevel::Info | LogLevel::Success => tracing::info!("{}", entry.message),
        }
        self.logs.push(entry);
        if self.logs.len() > self.max_logs {
            self.logs.remove(0);
        }
    }

    pub fn show_error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        let title = title.into();
        let message = message.into();
        self.log(LogEntry::error(format!("{}: {}", title, message)));
        self.error_popup = Some(ErrorPopup::new(title, message));
    }

    pub fn dismiss_error(&mut self) {
        self.error_popup = None;
    }

    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    // ============================================
    // Derived data
    // ============================================

    pub fn scoped_features(&self) -> &[FeatureDto] {
        &self.scoped_features
    }

    pub fn selected_product(&self) -> Option<&ProductDto> {
        let id = self.selected_product?;
        self.products.iter().find(|p| p.id == id)
    }

    pub fn product_name(&self, id: Uuid) -> &str {
        self.products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.display_name())
            .unwrap_or("Unknown product")
    }

    pub fn feature(&self, id: Uuid) -> Option<&FeatureDto> {
        self.features.iter().find(|f| f.id == id)
    }

    /// Roadmap layout at the width seen on the last frame
    pub fn roadmap_layout(&self) -> RoadmapLayout {
        self.timeline_state.current_layout(&self.scoped_features)
    }

    /// Feature targeted by edit / delete / status keys on the active tab
    pub fn focused_feature(&self) -> Option<&FeatureDto> {
        if let Some(id) = self.feature_details {
            return self.feature(id);
        }
        match self.active_tab {
            Tab::Roadmap => self.timeline_state.selected_feature.and_then(|id| self.feature(id)),
            Tab::Features => self.scoped_features.get(self.feature_selected),
            Tab::Products => None,
        }
    }

    fn rescope(&mut self) {
        self.scoped_features = match self.selected_product {
            Some(product_id) => self
                .features
                .iter()
                .filter(|f| f.product_id == product_id)
                .cloned()
                .collect(),
            None => self.features.clone(),
        };

        // Drop selections that left the scope
        let scoped = &self.scoped_features;
        if let Some(id) = self.timeline_state.selected_feature {
            if !scoped.iter().any(|f| f.id == id) {
                self.timeline_state.selected_feature = None;
            }
        }
        if let Some(id) = self.feature_details {
            if !scoped.iter().any(|f| f.id == id) {
                self.feature_details = None;
            }
        }
        self.feature_selected = self
            .feature_selected
            .min(self.scoped_features.len().saturating_sub(1));
    }

    /// Scope the roadmap and feature list to a product (or to all)
    pub fn scope_to_product(&mut self, product_id: Option<Uuid>) {
        self.selected_product = product_id;
        self.timeline_state.lane_scroll = 0;
        self.rescope();
        let message = match product_id {
            Some(id) => format!("Showing features of {}", self.product_name(id)),
            None => "Showing features of all products".to_string(),
        };
        self.log(LogEntry::info(message));
    }

    // ============================================
    // Forms and dialogs
    // ============================================

    /// Open create form for current tab
    pub fn open_create_form(&mut self) {
        let form = match self.active_tab {
            Tab::Products => ActiveForm::Product(ProductForm::new_create()),
            Tab::Roadmap | Tab::Features => {
                let product_id = self
                    .selected_product
                    .or_else(|| self.products.get(self.product_selected).map(|p| p.id));
                let Some(product_id) = product_id else {
                    self.log(LogEntry::warning("Create a product before adding features"));
                    return;
                };
                ActiveForm::Feature(FeatureWizard::new_create(product_id, self.today()))
            }
        };
        self.form = Some(form);
        self.input_mode = InputMode::Editing;
    }

    /// Open edit form for selected item
    pub fn open_edit_form(&mut self) {
        let form = match self.active_tab {
            Tab::Products if self.feature_details.is_none() => self
                .products
                .get(self.product_selected)
                .map(|p| ActiveForm::Product(ProductForm::new_edit(p))),
            _ => self
                .focused_feature()
                .map(|f| ActiveForm::Feature(FeatureWizard::new_edit(f))),
        };

        if let Some(form) = form {
            self.feature_details = None;
            self.form = Some(form);
            self.input_mode = InputMode::Editing;
        }
    }

    /// Open delete confirmation dialog
    pub fn open_delete_confirm(&mut self) {
        let dialog = match self.active_tab {
            Tab::Products if self.feature_details.is_none() => {
                self.products.get(self.product_selected).map(|p| {
                    ConfirmDialog::new_delete(EntityType::Product, p.id, p.display_name())
                })
            }
            _ => self.focused_feature().map(|f| {
                ConfirmDialog::new_delete(EntityType::Feature, f.id, f.display_title())
            }),
        };

        if let Some(dialog) = dialog {
            self.feature_details = None;
            self.confirm_dialog = Some(dialog);
            self.input_mode = InputMode::Confirming;
        }
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn close_confirm(&mut self) {
        self.confirm_dialog = None;
        self.input_mode = InputMode::Normal;
    }

    /// Advance the focused feature's status
    fn cycle_focused_status(&mut self) -> Option<ApiCommand> {
        let (id, title, next) = {
            let feature = self.focused_feature()?;
            (
                feature.id,
                feature.display_title().to_string(),
                feature.status.next(),
            )
        };
        self.log(LogEntry::info(format!("Setting \"{}\" to {}...", title, next)));
        Some(ApiCommand::UpdateFeatureStatus(id, next))
    }

    // ============================================
    // API messages
    // ============================================

    pub fn handle_api_message(&mut self, message: ApiMessage) {
        match message {
            ApiMessage::ProductsLoaded(products) => {
                let count = products.len();
                self.products = products;
                self.is_loading = false;
                self.last_refresh = Some(Instant::now());
                self.product_selected = self
                    .product_selected
                    .min(self.products.len().saturating_sub(1));

                // The scoped product may have been deleted elsewhere
                if let Some(id) = self.selected_product {
                    if !self.products.iter().any(|p| p.id == id) {
                        self.selected_product = None;
                        self.rescope();
                    }
                }
                self.log(LogEntry::success(format!("Loaded {} products", count)));
            }
            ApiMessage::FeaturesLoaded(features) => {
                let count = features.len();
                self.features = features;
                self.is_loading = false;
                self.last_refresh = Some(Instant::now());
                self.rescope();

                let unscheduled = self.features.iter().filter(|f| !f.is_scheduled()).count();
                self.log(LogEntry::success(format!("Loaded {} features", count)));
                if unscheduled > 0 {
                    self.log(LogEntry::warning(format!(
                        "{} features have no usable dates and are not on the roadmap",
                        unscheduled
                    )));
                }
            }
            ApiMessage::Error(error) => {
                self.is_loading = false;
                self.show_error("API Error", error);
            }
            ApiMessage::ConnectionStatus(connected) => {
                let was_connected = self.api_connected;
                self.api_connected = connected;

                if connected && !was_connected {
                    self.log(LogEntry::success("Connected to API"));
                } else if !connected && was_connected {
                    self.log(LogEntry::warning("Disconnected from API"));
                }
            }
            ApiMessage::Created(entity_type, id) => {
                self.log(LogEntry::success(format!(
                    "{} created ({})",
                    entity_type,
                    short_id(&id)
                )));
                if entity_type == EntityType::Feature {
                    self.timeline_state.selected_feature = Some(id);
                }
                self.close_form();
            }
            ApiMessage::Updated(entity_type, id) => {
                self.log(LogEntry::success(format!(
                    "{} updated ({})",
                    entity_type,
                    short_id(&id)
                )));
                if self.form.is_some() {
                    self.close_form();
                }
            }
            ApiMessage::Deleted(entity_type, id) => {
                self.log(LogEntry::success(format!(
                    "{} deleted ({})",
                    entity_type,
                    short_id(&id)
                )));
                // Drop it locally until the follow-up refresh lands
                match entity_type {
                    EntityType::Product => {
                        self.products.retain(|p| p.id != id);
                        self.features.retain(|f| f.product_id != id);
                        if self.selected_product == Some(id) {
                            self.selected_product = None;
                        }
                    }
                    EntityType::Feature => self.features.retain(|f| f.id != id),
                }
                self.rescope();
                self.close_confirm();
            }
        }
    }

    // ============================================
    // Keys
    // ============================================

    /// Handle key events and return optional API command
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ApiCommand> {
        if self.error_popup.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ')) {
                self.dismiss_error();
            }
            return None;
        }

        // Help overlay swallows keys until closed
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                self.show_help = false;
            }
            return None;
        }

        // Dispatch based on input mode
        match self.input_mode {
            InputMode::Normal if self.feature_details.is_some() => self.handle_details_key(key),
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Editing => self.handle_editing_key(key),
            InputMode::Confirming => self.handle_confirming_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<ApiCommand> {
        // Global shortcuts
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                return Some(ApiCommand::Shutdown);
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return Some(ApiCommand::Shutdown);
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                return None;
            }
            KeyCode::Char('r') => {
                self.is_loading = true;
                self.log(LogEntry::info("Refreshing data..."));
                return Some(ApiCommand::RefreshAll);
            }
            // Tabs
            KeyCode::Tab => {
                self.active_tab = self.active_tab.next();
                return None;
            }
            KeyCode::BackTab => {
                self.active_tab = self.active_tab.previous();
                return None;
            }
            KeyCode::Char(c @ '1'..='3') => {
                let idx = c as usize - '1' as usize;
                self.active_tab = Tab::all()[idx];
                return None;
            }
            // CRUD shortcuts
            KeyCode::Char('c') | KeyCode::Char('n') => {
                self.open_create_form();
                return None;
            }
            KeyCode::Char('e') => {
                self.open_edit_form();
                return None;
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                self.open_delete_confirm();
                return None;
            }
            _ => {}
        }

        // Tab-specific keys
        match self.active_tab {
            Tab::Products => {
                self.handle_products_key(key);
                None
            }
            Tab::Roadmap => self.handle_roadmap_key(key),
            Tab::Features => self.handle_features_key(key),
        }
    }

    fn handle_products_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let Some(id) = self.products.get(self.product_selected).map(|p| p.id) else {
                    return;
                };
                // Enter on the scoped product unscopes it
                if self.selected_product == Some(id) {
                    self.scope_to_product(None);
                } else {
                    self.scope_to_product(Some(id));
                    self.active_tab = Tab::Roadmap;
                }
            }
            KeyCode::Esc if self.selected_product.is_some() => self.scope_to_product(None),
            _ => {
                let total = self.products.len();
                Self::handle_list_key(&mut self.product_selected, key, total);
            }
        }
    }

    fn handle_roadmap_key(&mut self, key: KeyEvent) -> Option<ApiCommand> {
        match key.code {
            // Period and zoom
            KeyCode::Char('h') | KeyCode::Left => self.timeline_state.previous_period(),
            KeyCode::Char('l') | KeyCode::Right => self.timeline_state.next_period(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.timeline_state.zoom_in(),
            KeyCode::Char('-') => self.timeline_state.zoom_out(),
            KeyCode::Char('t') => self.timeline_state.go_to_today(),
            // Selection
            KeyCode::Char('j') | KeyCode::Down => {
                let layout = self.roadmap_layout();
                self.timeline_state.select_next(&layout);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let layout = self.roadmap_layout();
                self.timeline_state.select_previous(&layout);
            }
            // Lane scrolling
            KeyCode::PageDown => {
                let layout = self.roadmap_layout();
                let max_scroll = layout.lane_count.saturating_sub(1);
                self.timeline_state.lane_scroll = (self.timeline_state.lane_scroll
                    + self.timeline_state.visible_lanes())
                .min(max_scroll);
            }
            KeyCode::PageUp => {
                self.timeline_state.lane_scroll = self
                    .timeline_state
                    .lane_scroll
                    .saturating_sub(self.timeline_state.visible_lanes());
            }
            KeyCode::Enter => {
                self.feature_details = self.timeline_state.selected_feature;
            }
            KeyCode::Char('s') => return self.cycle_focused_status(),
            KeyCode::Esc => self.timeline_state.selected_feature = None,
            _ => {}
        }
        None
    }

    fn handle_features_key(&mut self, key: KeyEvent) -> Option<ApiCommand> {
        match key.code {
            KeyCode::Enter => {
                self.feature_details = self
                    .scoped_features
                    .get(self.feature_selected)
                    .map(|f| f.id);
            }
            KeyCode::Char('s') => return self.cycle_focused_status(),
            _ => {
                let total = self.scoped_features.len();
                Self::handle_list_key(&mut self.feature_selected, key, total);
            }
        }
        None
    }

    /// Keys while the feature details overlay is open
    fn handle_details_key(&mut self, key: KeyEvent) -> Option<ApiCommand> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                self.feature_details = None;
                None
            }
            KeyCode::Char('s') => self.cycle_focused_status(),
            KeyCode::Char('e') => {
                self.open_edit_form();
                None
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                self.open_delete_confirm();
                None
            }
            _ => None,
        }
    }

    /// Handle keys in editing mode (form)
    fn handle_editing_key(&mut self, key: KeyEvent) -> Option<ApiCommand> {
        let today = self.today();
        let Some(form) = &mut self.form else {
            self.input_mode = InputMode::Normal;
            return None;
        };
        let field = form.current_field();

        match key.code {
            KeyCode::Esc => self.close_form(),
            KeyCode::Tab | KeyCode::Down if !field.is_date_picker() || key.code == KeyCode::Tab => {
                form.next_field()
            }
            KeyCode::BackTab | KeyCode::Up if !field.is_date_picker() || key.code == KeyCode::BackTab => {
                form.prev_field()
            }
            KeyCode::Enter => return self.handle_form_submit(),
            KeyCode::Backspace => form.handle_backspace(),
            // Arrows step dates and cycle selectors
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                if let ActiveForm::Feature(wizard) = form {
                    if field.is_date_picker() {
                        let days = match key.code {
                            KeyCode::Up => 1,
                            KeyCode::Down => -1,
                            KeyCode::Right => 7,
                            _ => -7,
                        };
                        wizard.step_date(days, today);
                    } else if field.is_selector() {
                        wizard.cycle_status(key.code == KeyCode::Right);
                    }
                }
            }
            KeyCode::Char(' ') if field.is_selector() => {
                if let ActiveForm::Feature(wizard) = form {
                    wizard.cycle_status(true);
                }
            }
            KeyCode::Char(c) => form.handle_char(c),
            _ => {}
        }

        None
    }

    /// Enter inside a form: move on, change step, or submit
    fn handle_form_submit(&mut self) -> Option<ApiCommand> {
        let form = self.form.as_mut()?;
        let field = form.current_field();

        if field == FormField::CancelButton {
            self.close_form();
            return None;
        }

        if !field.is_button() {
            form.next_field();
            return None;
        }

        // Buttons: build the command for the form
        let result = match form {
            ActiveForm::Product(product) => match product.product_id {
                Some(id) => product
                    .build_update()
                    .map(|dto| ApiCommand::UpdateProduct(id, dto)),
                None => product.build_create().map(ApiCommand::CreateProduct),
            },
            ActiveForm::Feature(wizard) => match field {
                FormField::BackButton => {
                    wizard.previous_step();
                    return None;
                }
                FormField::NextButton => {
                    wizard.next_step();
                    return None;
                }
                _ => match wizard.feature_id {
                    Some(id) => wizard
                        .build_update()
                        .map(|dto| ApiCommand::UpdateFeature(id, dto)),
                    None => wizard.build_create().map(ApiCommand::CreateFeature),
                },
            },
        };

        match result {
            Ok(command) => {
                let action = match &command {
                    ApiCommand::CreateProduct(_) => "Creating product...",
                    ApiCommand::UpdateProduct(..) => "Updating product...",
                    ApiCommand::CreateFeature(_) => "Creating feature...",
                    _ => "Updating feature...",
                };
                self.log(LogEntry::info(action));
                Some(command)
            }
            Err(e) => {
                form.set_error(e.to_string());
                None
            }
        }
    }

    /// Handle keys in confirming mode (delete dialog)
    fn handle_confirming_key(&mut self, key: KeyEvent) -> Option<ApiCommand> {
        let Some(dialog) = &mut self.confirm_dialog else {
            self.input_mode = InputMode::Normal;
            return None;
        };

        // y/n answer directly; Enter takes the focused button
        let confirmed = match key.code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.close_confirm();
                return None;
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                dialog.yes_focused = !dialog.yes_focused;
                return None;
            }
            KeyCode::Enter => dialog.yes_focused,
            KeyCode::Char('y') | KeyCode::Char('Y') => true,
            _ => return None,
        };

        if !confirmed {
            self.close_confirm();
            return None;
        }

        let command = dialog.command();
        let entity_type = dialog.entity_type;
        self.log(LogEntry::info(format!("Deleting {}...", entity_type)));
        Some(command)
    }

    fn handle_list_key(selected: &mut usize, key: KeyEvent, total: usize) {
        if total == 0 {
            return;
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                *selected = (*selected + 1) % total;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                *selected = selected.checked_sub(1).unwrap_or(total - 1);
            }
            KeyCode::Char('g') | KeyCode::Home => {
                *selected = 0;
            }
            KeyCode::Char('G') | KeyCode::End => {
                *selected = total - 1;
            }
            _ => {}
        }
    }

    /// Per-frame housekeeping
    pub fn tick(&mut self) {
        if self
            .error_popup
            .as_ref()
            .is_some_and(|popup| popup.should_dismiss())
        {
            self.error_popup = None;
        }
    }

    pub fn status_text(&self) -> String {
        let connection = if self.api_connected {
            "Connected"
        } else {
            "Disconnected"
        };

        let loading = if self.is_loading { " [Loading...]" } else { "" };

        let last_refresh = self
            .last_refresh
            .map(|t| {
                let secs = t.elapsed().as_secs();
                if secs < 60 {
                    format!(" ({}s ago)", secs)
                } else {
                    format!(" ({}m ago)", secs / 60)
                }
            })
            .unwrap_or_default();

        // Product scope of the roadmap and feature list
        let scope = self
            .selected_product()
            .map(|p| p.display_name().to_string())
            .unwrap_or_else(|| "All products".to_string());

        format!(
            "{}{}{} | {} | {} | ?: Help | c: Create | e: Edit | d: Delete | q: Quit",
            connection,
            loading,
            last_refresh,
            self.active_tab.name(),
            scope
        )
    }
}
