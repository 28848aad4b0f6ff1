//! Data models for the application-config database.
//!
//! Each table has a `Db*` row struct (`FromRow`, TEXT ids and JSON columns)
//! and a domain struct with parsed types. Repositories fetch rows and
//! convert at the boundary, so the rest of the crate never sees raw column
//! representations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Bilingual (English/Welsh) text stored in the `*_json` columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct I18nText {
    pub en: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cy: Option<String>,
}

impl I18nText {
    pub fn new(en: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            cy: None,
        }
    }

    pub fn with_welsh(en: impl Into<String>, cy: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            cy: Some(cy.into()),
        }
    }

    /// "Copy of {en}" / "Copi o {cy}" titles for cloned entities. The Welsh
    /// side is blanked when the source had no Welsh title.
    pub fn copy_prefixed(&self) -> Self {
        Self {
            en: format!("Copy of {}", self.en),
            cy: self
                .cy
                .as_ref()
                .filter(|cy| !cy.is_empty())
                .map(|cy| format!("Copi o {}", cy)),
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize bilingual text")
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Failed to parse bilingual text column")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingType {
    Competitive,
    Uncompeted,
    Eoi,
}

impl FundingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundingType::Competitive => "COMPETITIVE",
            FundingType::Uncompeted => "UNCOMPETED",
            FundingType::Eoi => "EOI",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "COMPETITIVE" => Ok(FundingType::Competitive),
            "UNCOMPETED" => Ok(FundingType::Uncompeted),
            "EOI" => Ok(FundingType::Eoi),
            other => anyhow::bail!("Unknown funding type: {}", other),
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            FundingType::Competitive => "Competitive",
            FundingType::Uncompeted => "Un-competed",
            FundingType::Eoi => "Expression of interest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    InProgress,
    Complete,
}

impl RoundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundStatus::InProgress => "In progress",
            RoundStatus::Complete => "Complete",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "In progress" => Ok(RoundStatus::InProgress),
            "Complete" => Ok(RoundStatus::Complete),
            other => anyhow::bail!("Unknown round status: {}", other),
        }
    }
}

/// Component types understood by the external form runner. Stored and
/// serialized under the runner's own names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    TextField,
    FreeTextField,
    EmailAddressField,
    TelephoneNumberField,
    UkAddressField,
    Html,
    YesNoField,
    RadiosField,
    Para,
    DatePartsField,
    CheckboxesField,
    ClientSideFileUploadField,
    WebsiteField,
    MultilineTextField,
    NumberField,
    DateField,
    DateTimeField,
    DateTimePartsField,
    SelectField,
    InsetText,
    Details,
    List,
    AutocompleteField,
    FileUploadField,
    MonthYearField,
    TimeField,
    MultiInputField,
}

impl ComponentType {
    pub const ALL: [ComponentType; 27] = [
        ComponentType::TextField,
        ComponentType::FreeTextField,
        ComponentType::EmailAddressField,
        ComponentType::TelephoneNumberField,
        ComponentType::UkAddressField,
        ComponentType::Html,
        ComponentType::YesNoField,
        ComponentType::RadiosField,
        ComponentType::Para,
        ComponentType::DatePartsField,
        ComponentType::CheckboxesField,
        ComponentType::ClientSideFileUploadField,
        ComponentType::WebsiteField,
        ComponentType::MultilineTextField,
        ComponentType::NumberField,
        ComponentType::DateField,
        ComponentType::DateTimeField,
        ComponentType::DateTimePartsField,
        ComponentType::SelectField,
        ComponentType::InsetText,
        ComponentType::Details,
        ComponentType::List,
        ComponentType::AutocompleteField,
        ComponentType::FileUploadField,
        ComponentType::MonthYearField,
        ComponentType::TimeField,
        ComponentType::MultiInputField,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::TextField => "TextField",
            ComponentType::FreeTextField => "FreeTextField",
            ComponentType::EmailAddressField => "EmailAddressField",
            ComponentType::TelephoneNumberField => "TelephoneNumberField",
            ComponentType::UkAddressField => "UkAddressField",
            ComponentType::Html => "Html",
            ComponentType::YesNoField => "YesNoField",
            ComponentType::RadiosField => "RadiosField",
            ComponentType::Para => "Para",
            ComponentType::DatePartsField => "DatePartsField",
            ComponentType::CheckboxesField => "CheckboxesField",
            ComponentType::ClientSideFileUploadField => "ClientSideFileUploadField",
            ComponentType::WebsiteField => "WebsiteField",
            ComponentType::MultilineTextField => "MultilineTextField",
            ComponentType::NumberField => "NumberField",
            ComponentType::DateField => "DateField",
            ComponentType::DateTimeField => "DateTimeField",
            ComponentType::DateTimePartsField => "DateTimePartsField",
            ComponentType::SelectField => "SelectField",
            ComponentType::InsetText => "InsetText",
            ComponentType::Details => "Details",
            ComponentType::List => "List",
            ComponentType::AutocompleteField => "AutocompleteField",
            ComponentType::FileUploadField => "FileUploadField",
            ComponentType::MonthYearField => "MonthYearField",
            ComponentType::TimeField => "TimeField",
            ComponentType::MultiInputField => "MultiInputField",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == raw)
            .with_context(|| format!("Component type not found: {}", raw))
    }

    /// Content-only components use a reduced shape in the runner document
    /// and never contribute answers to assessment configs.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            ComponentType::Html | ComponentType::Para | ComponentType::InsetText | ComponentType::Details
        )
    }

    pub fn is_yes_no(&self) -> bool {
        matches!(self, ComponentType::YesNoField)
    }

    pub fn is_multi_input(&self) -> bool {
        matches!(self, ComponentType::MultiInputField)
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Fund {
    pub fund_id: Uuid,
    pub name: I18nText,
    pub title: I18nText,
    pub description: I18nText,
    pub short_name: String,
    pub welsh_available: bool,
    pub funding_type: FundingType,
    pub ggis_scheme_reference_number: Option<String>,
    pub owner_organisation_id: Option<Uuid>,
    pub is_template: bool,
    pub audit_info: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct Round {
    pub round_id: Uuid,
    pub fund_id: Uuid,
    pub title: I18nText,
    pub short_name: String,
    pub opens: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub assessment_start: Option<DateTime<Utc>>,
    pub reminder_date: Option<DateTime<Utc>>,
    pub assessment_deadline: Option<DateTime<Utc>>,
    pub prospectus_link: String,
    pub privacy_notice_link: String,
    pub contact_email: Option<String>,
    pub feedback_link: Option<String>,
    pub guidance_url: Option<String>,
    pub project_name_field_id: Option<String>,
    pub instructions: Option<I18nText>,
    pub application_guidance: Option<I18nText>,
    pub all_uploaded_documents_section_available: bool,
    pub application_fields_download_available: bool,
    pub display_logo_on_pdf_exports: bool,
    pub mark_as_complete_enabled: bool,
    pub is_expression_of_interest: bool,
    pub send_deadline_reminder_emails: bool,
    pub send_incomplete_application_emails: bool,
    pub feedback_survey_config: Option<Value>,
    pub eligibility_config: Option<Value>,
    pub eoi_decision_schema: Option<Value>,
    pub status: RoundStatus,
    pub section_base_path: Option<i64>,
    pub is_template: bool,
    pub template_name: Option<String>,
    pub source_template_id: Option<Uuid>,
    pub audit_info: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub section_id: Uuid,
    pub round_id: Option<Uuid>,
    pub name_in_apply_json: I18nText,
    pub index_in_round: i64,
    pub template_name: Option<String>,
    pub is_template: bool,
    pub source_template_id: Option<Uuid>,
    pub audit_info: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct Form {
    pub form_id: Uuid,
    pub section_id: Option<Uuid>,
    pub name_in_apply_json: I18nText,
    pub section_index: i64,
    pub runner_publish_name: Option<String>,
    pub form_json: Option<Value>,
    pub template_name: Option<String>,
    pub is_template: bool,
    pub source_template_id: Option<Uuid>,
    pub audit_info: Option<Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub page_id: Uuid,
    pub form_id: Option<Uuid>,
    pub display_path: String,
    pub name_in_apply_json: I18nText,
    pub form_index: Option<i64>,
    pub controller: Option<String>,
    pub options: Option<Value>,
    pub form_section_id: Option<Uuid>,
    pub default_next_page_id: Option<Uuid>,
    pub is_template: bool,
    pub template_name: Option<String>,
    pub source_template_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct Component {
    pub component_id: Uuid,
    pub page_id: Option<Uuid>,
    pub parent_component_id: Option<Uuid>,
    pub title: Option<String>,
    pub hint_text: Option<String>,
    pub content: Option<String>,
    pub options: Option<Value>,
    pub schema: Option<Value>,
    pub component_type: ComponentType,
    pub page_index: Option<i64>,
    pub runner_component_name: String,
    pub list_id: Option<Uuid>,
    pub is_template: bool,
    pub template_name: Option<String>,
    pub source_template_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct ListDef {
    pub list_id: Uuid,
    pub name: String,
    pub list_type: String,
    pub items: Value,
    pub title: Option<String>,
    pub is_template: bool,
}

/// Visual grouping of pages within the runner document; distinct from the
/// `Section` entity.
#[derive(Debug, Clone)]
pub struct FormSection {
    pub form_section_id: Uuid,
    pub name: String,
    pub title: String,
    pub hide_title: bool,
    pub is_template: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCondition {
    pub field: Value,
    pub operator: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinator: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionValue {
    pub name: String,
    pub conditions: Vec<SubCondition>,
}

#[derive(Debug, Clone)]
pub struct Condition {
    pub condition_id: Uuid,
    pub form_id: Option<Uuid>,
    pub name: String,
    pub display_name: String,
    pub value: ConditionValue,
    pub is_template: bool,
}

#[derive(Debug, Clone)]
pub struct PageCondition {
    pub page_condition_id: Uuid,
    pub condition_id: Uuid,
    pub page_id: Uuid,
    pub destination_page_path: String,
}

// ---------------------------------------------------------------------------
// Loaded aggregates
// ---------------------------------------------------------------------------

/// A component with its multi-input children and resolved list, as loaded
/// for document assembly.
#[derive(Debug, Clone)]
pub struct ComponentTree {
    pub component: Component,
    pub children: Vec<ComponentTree>,
    pub list: Option<ListDef>,
}

#[derive(Debug, Clone)]
pub struct PageTree {
    pub page: Page,
    pub components: Vec<ComponentTree>,
    pub form_section: Option<FormSection>,
}

/// A fully loaded form: everything `build_form_json` needs, detached from
/// the database.
#[derive(Debug, Clone)]
pub struct FormTree {
    pub form: Form,
    pub pages: Vec<PageTree>,
    pub conditions: Vec<Condition>,
    pub page_conditions: Vec<PageCondition>,
}

// ---------------------------------------------------------------------------
// Column parsing helpers
// ---------------------------------------------------------------------------

pub(crate) fn parse_uuid(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("Invalid {} id: {}", what, raw))
}

pub(crate) fn parse_opt_uuid(raw: &Option<String>, what: &str) -> Result<Option<Uuid>> {
    raw.as_deref().map(|r| parse_uuid(r, what)).transpose()
}

pub(crate) fn parse_json_column(raw: &Option<String>) -> Result<Option<Value>> {
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => serde_json::from_str(text)
            .map(Some)
            .context("Failed to parse JSON column"),
    }
}

pub(crate) fn parse_i18n_column(raw: &Option<String>) -> Result<Option<I18nText>> {
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => I18nText::from_json_str(text).map(Some),
    }
}

/// Form submissions carry booleans as the strings "true"/"false"; the model
/// layer converts explicitly at this boundary.
pub fn bool_from_form_str(raw: &str, field: &str) -> Result<bool> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => anyhow::bail!("Field '{}' must be \"true\" or \"false\", got \"{}\"", field, other),
    }
}

pub fn bool_to_form_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Optional JSON-text fields (e.g. the EOI decision schema) accept empty or
/// missing input; syntactically invalid non-empty JSON is a validation
/// error naming the field.
pub fn parse_optional_json_text(raw: Option<&str>, field: &str) -> Result<Option<Value>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => serde_json::from_str(text)
            .map(Some)
            .with_context(|| format!("Field '{}' is not valid JSON", field)),
    }
}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct DbFund {
    pub fund_id: String,
    pub name_json: String,
    pub title_json: String,
    pub description_json: String,
    pub short_name: String,
    pub welsh_available: bool,
    pub funding_type: String,
    pub ggis_scheme_reference_number: Option<String>,
    pub owner_organisation_id: Option<String>,
    pub is_template: bool,
    pub audit_info: Option<String>,
}

impl TryFrom<DbFund> for Fund {
    type Error = anyhow::Error;

    fn try_from(row: DbFund) -> Result<Self> {
        Ok(Fund {
            fund_id: parse_uuid(&row.fund_id, "fund")?,
            name: I18nText::from_json_str(&row.name_json)?,
            title: I18nText::from_json_str(&row.title_json)?,
            description: I18nText::from_json_str(&row.description_json)?,
            short_name: row.short_name,
            welsh_available: row.welsh_available,
            funding_type: FundingType::parse(&row.funding_type)?,
            ggis_scheme_reference_number: row.ggis_scheme_reference_number,
            owner_organisation_id: parse_opt_uuid(&row.owner_organisation_id, "organisation")?,
            is_template: row.is_template,
            audit_info: parse_json_column(&row.audit_info)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbRound {
    pub round_id: String,
    pub fund_id: String,
    pub title_json: String,
    pub short_name: String,
    pub opens: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub assessment_start: Option<DateTime<Utc>>,
    pub reminder_date: Option<DateTime<Utc>>,
    pub assessment_deadline: Option<DateTime<Utc>>,
    pub prospectus_link: String,
    pub privacy_notice_link: String,
    pub contact_email: Option<String>,
    pub feedback_link: Option<String>,
    pub guidance_url: Option<String>,
    pub project_name_field_id: Option<String>,
    pub instructions_json: Option<String>,
    pub application_guidance_json: Option<String>,
    pub all_uploaded_documents_section_available: bool,
    pub application_fields_download_available: bool,
    pub display_logo_on_pdf_exports: bool,
    pub mark_as_complete_enabled: bool,
    pub is_expression_of_interest: bool,
    pub send_deadline_reminder_emails: bool,
    pub send_incomplete_application_emails: bool,
    pub feedback_survey_config: Option<String>,
    pub eligibility_config: Option<String>,
    pub eoi_decision_schema: Option<String>,
    pub status: String,
    pub section_base_path: Option<i64>,
    pub is_template: bool,
    pub template_name: Option<String>,
    pub source_template_id: Option<String>,
    pub audit_info: Option<String>,
}

impl TryFrom<DbRound> for Round {
    type Error = anyhow::Error;

    fn try_from(row: DbRound) -> Result<Self> {
        Ok(Round {
            round_id: parse_uuid(&row.round_id, "round")?,
            fund_id: parse_uuid(&row.fund_id, "fund")?,
            title: I18nText::from_json_str(&row.title_json)?,
            short_name: row.short_name,
            opens: row.opens,
            deadline: row.deadline,
            assessment_start: row.assessment_start,
            reminder_date: row.reminder_date,
            assessment_deadline: row.assessment_deadline,
            prospectus_link: row.prospectus_link,
            privacy_notice_link: row.privacy_notice_link,
            contact_email: row.contact_email,
            feedback_link: row.feedback_link,
            guidance_url: row.guidance_url,
            project_name_field_id: row.project_name_field_id,
            instructions: parse_i18n_column(&row.instructions_json)?,
            application_guidance: parse_i18n_column(&row.application_guidance_json)?,
            all_uploaded_documents_section_available: row.all_uploaded_documents_section_available,
            application_fields_download_available: row.application_fields_download_available,
            display_logo_on_pdf_exports: row.display_logo_on_pdf_exports,
            mark_as_complete_enabled: row.mark_as_complete_enabled,
            is_expression_of_interest: row.is_expression_of_interest,
            send_deadline_reminder_emails: row.send_deadline_reminder_emails,
            send_incomplete_application_emails: row.send_incomplete_application_emails,
            feedback_survey_config: parse_json_column(&row.feedback_survey_config)?,
            eligibility_config: parse_json_column(&row.eligibility_config)?,
            eoi_decision_schema: parse_json_column(&row.eoi_decision_schema)?,
            status: RoundStatus::parse(&row.status)?,
            section_base_path: row.section_base_path,
            is_template: row.is_template,
            template_name: row.template_name,
            source_template_id: parse_opt_uuid(&row.source_template_id, "round template")?,
            audit_info: parse_json_column(&row.audit_info)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbSection {
    pub section_id: String,
    pub round_id: Option<String>,
    pub name_in_apply_json: String,
    pub index_in_round: Option<i64>,
    pub template_name: Option<String>,
    pub is_template: bool,
    pub source_template_id: Option<String>,
    pub audit_info: Option<String>,
}

impl TryFrom<DbSection> for Section {
    type Error = anyhow::Error;

    fn try_from(row: DbSection) -> Result<Self> {
        Ok(Section {
            section_id: parse_uuid(&row.section_id, "section")?,
            round_id: parse_opt_uuid(&row.round_id, "round")?,
            name_in_apply_json: I18nText::from_json_str(&row.name_in_apply_json)?,
            index_in_round: row.index_in_round.unwrap_or(0),
            template_name: row.template_name,
            is_template: row.is_template,
            source_template_id: parse_opt_uuid(&row.source_template_id, "section template")?,
            audit_info: parse_json_column(&row.audit_info)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbForm {
    pub form_id: String,
    pub section_id: Option<String>,
    pub name_in_apply_json: String,
    pub section_index: Option<i64>,
    pub runner_publish_name: Option<String>,
    pub form_json: Option<String>,
    pub template_name: Option<String>,
    pub is_template: bool,
    pub source_template_id: Option<String>,
    pub audit_info: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<DbForm> for Form {
    type Error = anyhow::Error;

    fn try_from(row: DbForm) -> Result<Self> {
        Ok(Form {
            form_id: parse_uuid(&row.form_id, "form")?,
            section_id: parse_opt_uuid(&row.section_id, "section")?,
            name_in_apply_json: I18nText::from_json_str(&row.name_in_apply_json)?,
            section_index: row.section_index.unwrap_or(0),
            runner_publish_name: row.runner_publish_name,
            form_json: parse_json_column(&row.form_json)?,
            template_name: row.template_name,
            is_template: row.is_template,
            source_template_id: parse_opt_uuid(&row.source_template_id, "form template")?,
            audit_info: parse_json_column(&row.audit_info)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbPage {
    pub page_id: String,
    pub form_id: Option<String>,
    pub display_path: String,
    pub name_in_apply_json: String,
    pub form_index: Option<i64>,
    pub controller: Option<String>,
    pub options: Option<String>,
    pub form_section_id: Option<String>,
    pub default_next_page_id: Option<String>,
    pub is_template: bool,
    pub template_name: Option<String>,
    pub source_template_id: Option<String>,
}

impl TryFrom<DbPage> for Page {
    type Error = anyhow::Error;

    fn try_from(row: DbPage) -> Result<Self> {
        Ok(Page {
            page_id: parse_uuid(&row.page_id, "page")?,
            form_id: parse_opt_uuid(&row.form_id, "form")?,
            display_path: row.display_path,
            name_in_apply_json: I18nText::from_json_str(&row.name_in_apply_json)?,
            form_index: row.form_index,
            controller: row.controller,
            options: parse_json_column(&row.options)?,
            form_section_id: parse_opt_uuid(&row.form_section_id, "form section")?,
            default_next_page_id: parse_opt_uuid(&row.default_next_page_id, "page")?,
            is_template: row.is_template,
            template_name: row.template_name,
            source_template_id: parse_opt_uuid(&row.source_template_id, "page template")?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbComponent {
    pub component_id: String,
    pub page_id: Option<String>,
    pub parent_component_id: Option<String>,
    pub title: Option<String>,
    pub hint_text: Option<String>,
    pub content: Option<String>,
    pub options: Option<String>,
    pub component_schema: Option<String>,
    pub component_type: String,
    pub page_index: Option<i64>,
    pub runner_component_name: String,
    pub list_id: Option<String>,
    pub is_template: bool,
    pub template_name: Option<String>,
    pub source_template_id: Option<String>,
}

impl TryFrom<DbComponent> for Component {
    type Error = anyhow::Error;

    fn try_from(row: DbComponent) -> Result<Self> {
        Ok(Component {
            component_id: parse_uuid(&row.component_id, "component")?,
            page_id: parse_opt_uuid(&row.page_id, "page")?,
            parent_component_id: parse_opt_uuid(&row.parent_component_id, "component")?,
            title: row.title,
            hint_text: row.hint_text,
            content: row.content,
            options: parse_json_column(&row.options)?,
            schema: parse_json_column(&row.component_schema)?,
            component_type: ComponentType::parse(&row.component_type)?,
            page_index: row.page_index,
            runner_component_name: row.runner_component_name,
            list_id: parse_opt_uuid(&row.list_id, "list")?,
            is_template: row.is_template,
            template_name: row.template_name,
            source_template_id: parse_opt_uuid(&row.source_template_id, "component template")?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbListDef {
    pub list_id: String,
    pub name: String,
    pub list_type: String,
    pub items: String,
    pub title: Option<String>,
    pub is_template: bool,
}

impl TryFrom<DbListDef> for ListDef {
    type Error = anyhow::Error;

    fn try_from(row: DbListDef) -> Result<Self> {
        Ok(ListDef {
            list_id: parse_uuid(&row.list_id, "list")?,
            name: row.name,
            list_type: row.list_type,
            items: serde_json::from_str(&row.items).context("Failed to parse list items")?,
            title: row.title,
            is_template: row.is_template,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbFormSection {
    pub form_section_id: String,
    pub name: String,
    pub title: String,
    pub hide_title: bool,
    pub is_template: bool,
}

impl TryFrom<DbFormSection> for FormSection {
    type Error = anyhow::Error;

    fn try_from(row: DbFormSection) -> Result<Self> {
        Ok(FormSection {
            form_section_id: parse_uuid(&row.form_section_id, "form section")?,
            name: row.name,
            title: row.title,
            hide_title: row.hide_title,
            is_template: row.is_template,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbCondition {
    pub condition_id: String,
    pub form_id: Option<String>,
    pub name: String,
    pub display_name: String,
    pub value: String,
    pub is_template: bool,
}

impl TryFrom<DbCondition> for Condition {
    type Error = anyhow::Error;

    fn try_from(row: DbCondition) -> Result<Self> {
        Ok(Condition {
            condition_id: parse_uuid(&row.condition_id, "condition")?,
            form_id: parse_opt_uuid(&row.form_id, "form")?,
            name: row.name,
            display_name: row.display_name,
            value: serde_json::from_str(&row.value).context("Failed to parse condition value")?,
            is_template: row.is_template,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbPageCondition {
    pub page_condition_id: String,
    pub condition_id: String,
    pub page_id: String,
    pub destination_page_path: String,
}

impl TryFrom<DbPageCondition> for PageCondition {
    type Error = anyhow::Error;

    fn try_from(row: DbPageCondition) -> Result<Self> {
        Ok(PageCondition {
            page_condition_id: parse_uuid(&row.page_condition_id, "page condition")?,
            condition_id: parse_uuid(&row.condition_id, "condition")?,
            page_id: parse_uuid(&row.page_id, "page")?,
            destination_page_path: row.destination_page_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_prefix_handles_missing_welsh() {
        let title = I18nText::new("Community Fund Round 2");
        let copied = title.copy_prefixed();
        assert_eq!(copied.en, "Copy of Community Fund Round 2");
        assert_eq!(copied.cy, None);

        let bilingual = I18nText::with_welsh("Round 2", "Rownd 2");
        let copied = bilingual.copy_prefixed();
        assert_eq!(copied.en, "Copy of Round 2");
        assert_eq!(copied.cy.as_deref(), Some("Copi o Rownd 2"));
    }

    #[test]
    fn form_bool_strings_round_trip() {
        assert!(bool_from_form_str("true", "flag").unwrap());
        assert!(!bool_from_form_str("false", "flag").unwrap());
        assert!(bool_from_form_str("yes", "flag").is_err());
        assert_eq!(bool_to_form_str(true), "true");
    }

    #[test]
    fn optional_json_text_tolerates_empty_input() {
        assert_eq!(parse_optional_json_text(None, "eoi_decision_schema").unwrap(), None);
        assert_eq!(parse_optional_json_text(Some(""), "eoi_decision_schema").unwrap(), None);
        assert_eq!(parse_optional_json_text(Some("   "), "eoi_decision_schema").unwrap(), None);
        assert!(parse_optional_json_text(Some("{\"a\": 1}"), "eoi_decision_schema")
            .unwrap()
            .is_some());
        let err = parse_optional_json_text(Some("{not json"), "eoi_decision_schema").unwrap_err();
        assert!(format!("{}", err).contains("eoi_decision_schema"));
    }

    #[test]
    fn component_type_parses_runner_names() {
        assert_eq!(ComponentType::parse("YesNoField").unwrap(), ComponentType::YesNoField);
        assert!(ComponentType::parse("NotAField").is_err());
        assert!(ComponentType::Html.is_read_only());
        assert!(!ComponentType::TextField.is_read_only());
    }
}
