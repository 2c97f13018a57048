//! Form state for the product form and the feature wizard.
//!
//! Forms hold raw text as typed; DTOs are built (and validated) on submit.
//! The feature wizard splits its fields over three steps and only lets the
//! user move forward when the current step validates.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::models::{
    self, CreateFeatureDto, CreateProductDto, FeatureDto, FeatureStatus, ProductDto,
    UpdateFeatureDto, UpdateProductDto,
};
use crate::roadmap::period::add_days;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Form field types for both forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Description,
    Title,
    StartDate,
    EndDate,
    Progress,
    Status,
    // Buttons
    SubmitButton,
    CancelButton,
    BackButton,
    NextButton,
}

impl FormField {
    pub fn product_fields() -> &'static [FormField] {
        &[
            FormField::Name,
            FormField::Description,
            FormField::SubmitButton,
            FormField::CancelButton,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Description => "Description",
            FormField::Title => "Title",
            FormField::StartDate => "Start Date",
            FormField::EndDate => "End Date",
            FormField::Progress => "Progress %",
            FormField::Status => "Status",
            FormField::SubmitButton => "Save",
            FormField::CancelButton => "Cancel",
            FormField::BackButton => "Back",
            FormField::NextButton => "Next",
        }
    }

    pub fn is_date_picker(&self) -> bool {
        matches!(self, FormField::StartDate | FormField::EndDate)
    }

    pub fn is_selector(&self) -> bool {
        matches!(self, FormField::Status)
    }

    pub fn is_button(&self) -> bool {
        matches!(
            self,
            FormField::SubmitButton
                | FormField::CancelButton
                | FormField::BackButton
                | FormField::NextButton
        )
    }
}

/// Focus ring over a static field list
fn step_focus(focused: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (focused + 1) % len
    } else {
        focused.checked_sub(1).unwrap_or(len - 1)
    }
}

fn optional_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ============================================
// Product form
// ============================================

/// Create / edit product form
#[derive(Debug, Clone)]
pub struct ProductForm {
    /// `None` when creating
    pub product_id: Option<Uuid>,
    pub focused_field: usize,
    pub error: Option<String>,
    pub name: String,
    pub description: String,
}

impl ProductForm {
    pub fn new_create() -> Self {
        Self {
            product_id: None,
            focused_field: 0,
            error: None,
            name: String::new(),
            description: String::new(),
        }
    }

    pub fn new_edit(product: &ProductDto) -> Self {
        Self {
            product_id: Some(product.id),
            focused_field: 0,
            error: None,
            name: product.name.clone().unwrap_or_default(),
            description: product.description.clone().unwrap_or_default(),
        }
    }

    pub fn title(&self) -> &'static str {
        if self.product_id.is_some() {
            " Edit Product "
        } else {
            " New Product "
        }
    }

    pub fn fields(&self) -> &'static [FormField] {
        FormField::product_fields()
    }

    pub fn current_field(&self) -> FormField {
        self.fields()[self.focused_field.min(self.fields().len() - 1)]
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Description => &self.description,
            _ => "",
        }
    }

    fn current_text_mut(&mut self) -> Option<&mut String> {
        match self.current_field() {
            FormField::Name => Some(&mut self.name),
            FormField::Description => Some(&mut self.description),
            _ => None,
        }
    }

    pub fn build_create(&self) -> Result<CreateProductDto, ValidationError> {
        let dto = CreateProductDto {
            name: self.name.trim().to_string(),
            description: optional_text(&self.description),
        };
        dto.validate()?;
        Ok(dto)
    }

    pub fn build_update(&self) -> Result<UpdateProductDto, ValidationError> {
        let dto = UpdateProductDto {
            name: self.name.trim().to_string(),
            description: optional_text(&self.description),
        };
        dto.validate()?;
        Ok(dto)
    }
}

// ============================================
// Feature wizard
// ============================================

/// Steps of the feature wizard, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardStep {
    #[default]
    Details,
    Schedule,
    Review,
}

impl WizardStep {
    pub fn all() -> &'static [WizardStep] {
        &[WizardStep::Details, WizardStep::Schedule, WizardStep::Review]
    }

    pub fn index(&self) -> usize {
        match self {
            WizardStep::Details => 0,
            WizardStep::Schedule => 1,
            WizardStep::Review => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WizardStep::Details => "Details",
            WizardStep::Schedule => "Schedule",
            WizardStep::Review => "Review",
        }
    }

    pub fn fields(&self) -> &'static [FormField] {
        match self {
            WizardStep::Details => &[
                FormField::Title,
                FormField::Description,
                FormField::NextButton,
                FormField::CancelButton,
            ],
            WizardStep::Schedule => &[
                FormField::StartDate,
                FormField::EndDate,
                FormField::Progress,
                FormField::NextButton,
                FormField::BackButton,
            ],
            WizardStep::Review => &[
                FormField::Status,
                FormField::SubmitButton,
                FormField::BackButton,
            ],
        }
    }

    fn next(&self) -> Option<Self> {
        match self {
            WizardStep::Details => Some(WizardStep::Schedule),
            WizardStep::Schedule => Some(WizardStep::Review),
            WizardStep::Review => None,
        }
    }

    fn previous(&self) -> Option<Self> {
        match self {
            WizardStep::Details => None,
            WizardStep::Schedule => Some(WizardStep::Details),
            WizardStep::Review => Some(WizardStep::Schedule),
        }
    }
}

/// Multi-step create / edit feature form
#[derive(Debug, Clone)]
pub struct FeatureWizard {
    /// `None` when creating
    pub feature_id: Option<Uuid>,
    pub product_id: Uuid,
    pub step: WizardStep,
    pub focused_field: usize,
    pub error: Option<String>,
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub progress: String,
    pub status: FeatureStatus,
}

impl FeatureWizard {
    /// New feature for `product_id`, scheduled over the next two weeks
    pub fn new_create(product_id: Uuid, today: NaiveDate) -> Self {
        Self {
            feature_id: None,
            product_id,
            step: WizardStep::Details,
            focused_field: 0,
            error: None,
            title: String::new(),
            description: String::new(),
            start_date: today.format(DATE_FORMAT).to_string(),
            end_date: add_days(today, 13).format(DATE_FORMAT).to_string(),
            progress: String::from("0"),
            status: FeatureStatus::Backlog,
        }
    }

    pub fn new_edit(feature: &FeatureDto) -> Self {
        let fmt_date = |d: Option<NaiveDate>| {
            d.map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        };
        Self {
            feature_id: Some(feature.id),
            product_id: feature.product_id,
            step: WizardStep::Details,
            focused_field: 0,
            error: None,
            title: feature.title.clone().unwrap_or_default(),
            description: feature.description.clone().unwrap_or_default(),
            start_date: fmt_date(feature.start_date),
            end_date: fmt_date(feature.end_date),
            progress: feature
                .progress
                .map(|p| p.to_string())
                .unwrap_or_default(),
            status: feature.status,
        }
    }

    pub fn heading(&self) -> String {
        let verb = if self.feature_id.is_some() { "Edit" } else { "New" };
        format!(
            " {} Feature · {}/{} {} ",
            verb,
            self.step.index() + 1,
            WizardStep::all().len(),
            self.step.name()
        )
    }

    pub fn fields(&self) -> &'static [FormField] {
        self.step.fields()
    }

    pub fn current_field(&self) -> FormField {
        let fields = self.fields();
        fields[self.focused_field.min(fields.len() - 1)]
    }

    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Title => self.title.clone(),
            FormField::Description => self.description.clone(),
            FormField::StartDate => self.start_date.clone(),
            FormField::EndDate => self.end_date.clone(),
            FormField::Progress => self.progress.clone(),
            FormField::Status => self.status.to_string(),
            _ => String::new(),
        }
    }

    fn current_text_mut(&mut self) -> Option<&mut String> {
        match self.current_field() {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::StartDate => Some(&mut self.start_date),
            FormField::EndDate => Some(&mut self.end_date),
            FormField::Progress => Some(&mut self.progress),
            _ => None,
        }
    }

    /// Shift the focused date field by `days`; an empty or unreadable date
    /// starts from `today`.
    pub fn step_date(&mut self, days: i64, today: NaiveDate) {
        let text = match self.current_field() {
            FormField::StartDate => &mut self.start_date,
            FormField::EndDate => &mut self.end_date,
            _ => return,
        };
        let next = match models::parse_date(text) {
            Some(date) => add_days(date, days),
            None => today,
        };
        *text = next.format(DATE_FORMAT).to_string();
    }

    pub fn cycle_status(&mut self, forward: bool) {
        self.status = if forward {
            self.status.next()
        } else {
            // three steps forward is one back on a four-state cycle
            self.status.next().next().next()
        };
    }

    fn parse_date_field(
        field: &'static str,
        text: &str,
    ) -> Result<Option<NaiveDate>, ValidationError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        models::parse_date(text)
            .map(Some)
            .ok_or(ValidationError::InvalidDate { field })
    }

    fn parse_progress(&self) -> Result<Option<i32>, ValidationError> {
        let text = self.progress.trim();
        if text.is_empty() {
            return Ok(None);
        }
        match text.parse::<i32>() {
            Ok(p) if (0..=100).contains(&p) => Ok(Some(p)),
            _ => Err(ValidationError::InvalidProgress),
        }
    }

    fn schedule(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>), ValidationError> {
        let start = Self::parse_date_field("Start Date", &self.start_date)?;
        let end = Self::parse_date_field("End Date", &self.end_date)?;
        models::validate_schedule(start, end)?;
        Ok((start, end))
    }

    /// Validate only the fields on the current step
    pub fn validate_step(&self) -> Result<(), ValidationError> {
        match self.step {
            WizardStep::Details => models::validate_title("Title", &self.title),
            WizardStep::Schedule => {
                self.schedule()?;
                self.parse_progress()?;
                Ok(())
            }
            WizardStep::Review => self.build_update().map(|_| ()),
        }
    }

    /// Advance when the current step validates; records the error otherwise
    pub fn next_step(&mut self) -> bool {
        if let Err(e) = self.validate_step() {
            self.error = Some(e.to_string());
            return false;
        }
        match self.step.next() {
            Some(step) => {
                self.step = step;
                self.focused_field = 0;
                self.error = None;
                true
            }
            None => false,
        }
    }

    /// Go back one step without validating
    pub fn previous_step(&mut self) {
        if let Some(step) = self.step.previous() {
            self.step = step;
            self.focused_field = 0;
            self.error = None;
        }
    }

    pub fn build_create(&self) -> Result<CreateFeatureDto, ValidationError> {
        let update = self.build_update()?;
        Ok(CreateFeatureDto {
            product_id: self.product_id,
            title: update.title,
            description: update.description,
            status: update.status,
            start_date: update.start_date,
            end_date: update.end_date,
            progress: update.progress,
        })
    }

    pub fn build_update(&self) -> Result<UpdateFeatureDto, ValidationError> {
        let (start_date, end_date) = self.schedule()?;
        let dto = UpdateFeatureDto {
            title: self.title.trim().to_string(),
            description: optional_text(&self.description),
            status: self.status,
            start_date,
            end_date,
            progress: self.parse_progress()?,
        };
        dto.validate()?;
        Ok(dto)
    }
}

// ============================================
// Active form
// ============================================

/// The form currently shown in the modal
#[derive(Debug, Clone)]
pub enum ActiveForm {
    Product(ProductForm),
    Feature(FeatureWizard),
}

impl ActiveForm {
    pub fn current_field(&self) -> FormField {
        match self {
            ActiveForm::Product(form) => form.current_field(),
            ActiveForm::Feature(wizard) => wizard.current_field(),
        }
    }

    fn focus(&mut self) -> (&mut usize, usize) {
        match self {
            ActiveForm::Product(form) => {
                let len = form.fields().len();
                (&mut form.focused_field, len)
            }
            ActiveForm::Feature(wizard) => {
                let len = wizard.fields().len();
                (&mut wizard.focused_field, len)
            }
        }
    }

    pub fn next_field(&mut self) {
        let (focused, len) = self.focus();
        *focused = step_focus(*focused, len, true);
    }

    pub fn prev_field(&mut self) {
        let (focused, len) = self.focus();
        *focused = step_focus(*focused, len, false);
    }

    pub fn handle_char(&mut self, c: char) {
        let text = match self {
            ActiveForm::Product(form) => form.current_text_mut(),
            ActiveForm::Feature(wizard) => wizard.current_text_mut(),
        };
        if let Some(text) = text {
            text.push(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        let text = match self {
            ActiveForm::Product(form) => form.current_text_mut(),
            ActiveForm::Feature(wizard) => wizard.current_text_mut(),
        };
        if let Some(text) = text {
            text.pop();
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ActiveForm::Product(form) => form.error.as_deref(),
            ActiveForm::Feature(wizard) => wizard.error.as_deref(),
        }
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        let error = Some(error.into());
        match self {
            ActiveForm::Product(form) => form.error = error,
            ActiveForm::Feature(wizard) => wizard.error = error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn wizard() -> FeatureWizard {
        FeatureWizard::new_create(Uuid::from_u128(1), date(2024, 3, 4))
    }

    #[test]
    fn test_details_step_requires_title() {
        let mut w = wizard();
        assert!(!w.next_step());
        assert_eq!(w.step, WizardStep::Details);
        assert_eq!(w.error.as_deref(), Some("Title is required"));

        w.title = "Onboarding".into();
        assert!(w.next_step());
        assert_eq!(w.step, WizardStep::Schedule);
        assert!(w.error.is_none());
    }

    #[test]
    fn test_schedule_step_rejects_inverted_and_partial_dates() {
        let mut w = wizard();
        w.title = "Search".into();
        w.next_step();

        w.end_date = "2024-03-01".into();
        assert!(!w.next_step());
        assert!(w.error.as_deref().unwrap().contains("before start date"));

        w.end_date.clear();
        assert!(!w.next_step());
        assert_eq!(w.error, Some(ValidationError::PartialSchedule.to_string()));

        w.start_date.clear();
        assert!(w.next_step(), "both dates empty leaves the feature unscheduled");
        assert_eq!(w.step, WizardStep::Review);
    }

    #[test]
    fn test_back_never_validates() {
        let mut w = wizard();
        w.title = "Billing".into();
        w.next_step();
        w.progress = "250".into();
        w.previous_step();
        assert_eq!(w.step, WizardStep::Details);
        assert!(w.error.is_none());
        assert!(w.next_step());
        assert_eq!(w.progress, "250");
    }

    #[test]
    fn test_build_create_carries_schedule_and_progress() {
        let mut w = wizard();
        w.title = "  Reports  ".into();
        w.description = "   ".into();
        w.progress = "40".into();
        w.status = FeatureStatus::Doing;

        let dto = w.build_create().unwrap();
        assert_eq!(dto.title, "Reports");
        assert_eq!(dto.description, None);
        assert_eq!(dto.start_date, Some(date(2024, 3, 4)));
        assert_eq!(dto.end_date, Some(date(2024, 3, 17)));
        assert_eq!(dto.progress, Some(40));
        assert_eq!(dto.product_id, Uuid::from_u128(1));

        w.progress = "abc".into();
        assert_eq!(w.build_create(), Err(ValidationError::InvalidProgress));
    }

    #[test]
    fn test_date_stepping() {
        let today = date(2024, 3, 4);
        let mut w = wizard();
        w.step = WizardStep::Schedule;
        w.focused_field = 0;

        w.step_date(1, today);
        assert_eq!(w.start_date, "2024-03-05");
        w.step_date(-7, today);
        assert_eq!(w.start_date, "2024-02-27");

        w.focused_field = 1;
        w.end_date.clear();
        w.step_date(7, today);
        assert_eq!(w.end_date, "2024-03-04");
    }

    #[test]
    fn test_date_stepping_stops_at_last_date() {
        let today = date(2024, 3, 4);
        let mut w = wizard();
        w.step = WizardStep::Schedule;
        w.focused_field = 0;
        w.start_date = NaiveDate::MAX.format(DATE_FORMAT).to_string();

        w.step_date(1, today);
        assert_eq!(models::parse_date(&w.start_date), Some(NaiveDate::MAX));
        w.step_date(7, today);
        assert_eq!(models::parse_date(&w.start_date), Some(NaiveDate::MAX));
        w.step_date(-1, today);
        assert_eq!(
            models::parse_date(&w.start_date),
            NaiveDate::MAX.pred_opt()
        );
    }

    #[test]
    fn test_edit_prefills_from_feature() {
        let feature = FeatureDto {
            id: Uuid::from_u128(9),
            product_id: Uuid::from_u128(2),
            title: Some("Export".into()),
            description: None,
            status: FeatureStatus::Blocked,
            start_date: None,
            end_date: None,
            progress: None,
        };
        let w = FeatureWizard::new_edit(&feature);
        assert_eq!(w.feature_id, Some(feature.id));
        assert!(w.start_date.is_empty() && w.progress.is_empty());
        assert!(w.heading().contains("Edit Feature"));

        let dto = w.build_update().unwrap();
        assert_eq!(dto.status, FeatureStatus::Blocked);
        assert_eq!(dto.start_date, None);
    }

    #[test]
    fn test_status_cycles_both_ways() {
        let mut w = wizard();
        w.cycle_status(true);
        assert_eq!(w.status, FeatureStatus::Doing);
        w.cycle_status(false);
        w.cycle_status(false);
        assert_eq!(w.status, FeatureStatus::Blocked);
    }

    #[test]
    fn test_active_form_typing_and_focus() {
        let mut form = ActiveForm::Product(ProductForm::new_create());
        for c in "Atlas".chars() {
            form.handle_char(c);
        }
        form.handle_backspace();
        form.prev_field();
        assert_eq!(form.current_field(), FormField::CancelButton);
        form.next_field();
        assert_eq!(form.current_field(), FormField::Name);

        let ActiveForm::Product(product) = &form else {
            panic!("expected product form");
        };
        assert_eq!(product.build_create().unwrap().name, "Atla");
        assert!(ProductForm::new_create().build_create().is_err());
    }
}
