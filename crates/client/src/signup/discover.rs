//! Build the signup view model from server-rendered markup.
//!
//! Only structural problems that leave nothing to address (a form or modal
//! without an id) fail discovery. Missing hooks are kept as `None` and
//! reported when the user submits. A modal target that selects nothing, or
//! is not a valid selector, leaves the form without a modal.

use scraper::{ElementRef, Html, Selector};

use marquee_core::ajax::{FIRST_NAME_FIELD, LAST_NAME_FIELD, TOKEN_FIELD};
use marquee_core::markers;

use super::view::{
    Dismissal, Focusable, MessageRegion, ProfileModal, SignupForm, SubmitControl, TokenField,
};
use crate::error::DiscoveryError;

/// Selectors built from the marker constants.
struct Selectors {
    wrapper: Selector,
    form: Selector,
    email: Selector,
    token: Selector,
    submit: Selector,
    input_wrapper: Selector,
    modal: Selector,
    profile_form: Selector,
    close: Selector,
    user_id: Selector,
    first_name: Selector,
    last_name: Selector,
    focusable: Selector,
    any_with_id: Selector,
}

impl Selectors {
    fn new() -> Result<Self, DiscoveryError> {
        let marker = |name: &str| parse(&format!("[{name}]"));
        Ok(Self {
            wrapper: marker(markers::SIGNUP_FORM)?,
            form: parse("form")?,
            email: parse(r#"input[type="email"]"#)?,
            token: parse(&format!(r#"input[name="{TOKEN_FIELD}"]"#))?,
            submit: parse(r#"input[type="submit"]"#)?,
            input_wrapper: marker(markers::INPUT_WRAPPER)?,
            modal: marker(markers::SIGNUP_MODAL)?,
            profile_form: marker(markers::PROFILE_FORM)?,
            close: marker(markers::MODAL_CLOSE)?,
            user_id: marker(markers::USER_ID_INPUT)?,
            first_name: parse(&format!(r#"input[name="{FIRST_NAME_FIELD}"]"#))?,
            last_name: parse(&format!(r#"input[name="{LAST_NAME_FIELD}"]"#))?,
            focusable: parse("button, [href], input, select, textarea, [tabindex]")?,
            any_with_id: parse("[id]")?,
        })
    }
}

fn parse(selector: &str) -> Result<Selector, DiscoveryError> {
    Selector::parse(selector).map_err(|e| DiscoveryError::InvalidSelector {
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

/// Every signup form and profile modal in `document`, in document order.
///
/// # Errors
///
/// Returns `DiscoveryError` if a signup wrapper has no form with an id, a
/// modal has no id, or a contract selector does not parse.
pub fn discover(document: &str) -> Result<(Vec<SignupForm>, Vec<ProfileModal>), DiscoveryError> {
    let selectors = Selectors::new()?;
    let html = Html::parse_document(document);

    let mut forms = html
        .select(&selectors.wrapper)
        .enumerate()
        .map(|(index, wrapper)| read_form(&html, &selectors, index, wrapper))
        .collect::<Result<Vec<_>, _>>()?;

    let modals = html
        .select(&selectors.modal)
        .enumerate()
        .map(|(index, modal)| read_modal(&selectors, index, modal))
        .collect::<Result<Vec<_>, _>>()?;

    for form in &mut forms {
        form.modal_id = form
            .modal_target
            .as_deref()
            .and_then(|target| target_modal(&html, &modals, target));
    }

    Ok((forms, modals))
}

/// Id of the first element `target` selects, if it is a discovered modal.
fn target_modal(html: &Html, modals: &[ProfileModal], target: &str) -> Option<String> {
    let Ok(selector) = Selector::parse(target) else {
        tracing::warn!(selector = target, "modal target is not a valid selector");
        return None;
    };
    let id = html.select(&selector).next()?.value().id()?;
    modals.iter().any(|m| m.id == id).then(|| id.to_owned())
}

fn read_form(
    html: &Html,
    selectors: &Selectors,
    index: usize,
    wrapper: ElementRef<'_>,
) -> Result<SignupForm, DiscoveryError> {
    let form_id = wrapper
        .select(&selectors.form)
        .next()
        .and_then(|form| form.value().id())
        .filter(|id| !id.is_empty())
        .ok_or(DiscoveryError::FormWithoutId { index })?
        .to_owned();

    let data = |name: &str| attr(wrapper, name);
    let tokens = wrapper
        .select(&selectors.token)
        .map(|field| TokenField {
            action: attr(field, markers::TOKEN_ACTION),
            value: field.value().attr("value").unwrap_or_default().to_owned(),
        })
        .collect();

    // Message regions usually sit inside the form but may be anywhere.
    let region = |id: String| {
        find_by_id(wrapper, selectors, &id)
            .or_else(|| find_by_id(html.root_element(), selectors, &id))
            .map(|element| message_region(element, id))
    };

    Ok(SignupForm {
        success: region(markers::success_region_id(&form_id)),
        failure: region(markers::failure_region_id(&form_id)),
        modal_target: data(markers::MODAL_TARGET),
        modal_id: None,
        register_action: data(markers::ACTION_REGISTER),
        token_action: data(markers::TOKEN_ACTION),
        email_input: wrapper
            .select(&selectors.email)
            .next()
            .map(|input| input.value().attr("value").unwrap_or_default().to_owned()),
        tokens,
        submit: wrapper.select(&selectors.submit).next().map(submit_control),
        input_wrapper_visible: wrapper
            .select(&selectors.input_wrapper)
            .next()
            .map(is_visible),
        form_id,
    })
}

fn read_modal(
    selectors: &Selectors,
    index: usize,
    element: ElementRef<'_>,
) -> Result<ProfileModal, DiscoveryError> {
    let id = element
        .value()
        .id()
        .filter(|id| !id.is_empty())
        .ok_or(DiscoveryError::ModalWithoutId { index })?;

    // Fields live in the profile form when the modal marks one.
    let fields = element
        .select(&selectors.profile_form)
        .next()
        .unwrap_or(element);
    let value_of = |selector: &Selector| {
        fields
            .select(selector)
            .next()
            .map(|input| input.value().attr("value").unwrap_or_default().to_owned())
    };

    let mut modal = ProfileModal::new(id);
    modal.update_action = attr(element, markers::ACTION_UPDATE);
    modal.token_action = attr(element, markers::TOKEN_ACTION);
    modal.target_form_id = attr(element, markers::TARGET_FORM_ID);
    modal.visible = is_visible(element);
    modal.user_id = value_of(&selectors.user_id);
    modal.first_name = value_of(&selectors.first_name).unwrap_or_default();
    modal.last_name = value_of(&selectors.last_name).unwrap_or_default();
    modal.submit = fields.select(&selectors.submit).next().map(submit_control);

    let failure_id = markers::modal_failure_region_id(id);
    modal.failure =
        find_by_id(element, selectors, &failure_id).map(|region| message_region(region, failure_id));

    modal.focusables = element
        .select(&selectors.focusable)
        .filter(|control| is_focusable(*control))
        .map(|control| Focusable {
            tag: control.value().name().to_owned(),
            id: control.value().id().map(String::from),
            name: control.value().attr("name").map(String::from),
        })
        .collect();

    for control in element.select(&selectors.close) {
        let how = if control.value().attr(markers::MODAL_OVERLAY).is_some() {
            Dismissal::Overlay
        } else {
            Dismissal::CloseButton
        };
        if !modal.dismissals.contains(&how) {
            modal.dismissals.push(how);
        }
    }

    Ok(modal)
}

/// Non-empty value of a data attribute.
fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn find_by_id<'a>(scope: ElementRef<'a>, selectors: &Selectors, id: &str) -> Option<ElementRef<'a>> {
    scope
        .select(&selectors.any_with_id)
        .find(|element| element.value().id() == Some(id))
}

fn message_region(element: ElementRef<'_>, id: String) -> MessageRegion {
    let inner = element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "div")
        .unwrap_or(element);
    let text = inner.text().collect::<String>().trim().to_owned();

    let mut region = MessageRegion::new(id, text);
    region.visible = is_visible(element);
    region
}

fn submit_control(element: ElementRef<'_>) -> SubmitControl {
    SubmitControl::new(
        element.value().attr("value").unwrap_or_default(),
        attr(element, markers::SUBMIT_WAIT),
    )
}

fn is_visible(element: ElementRef<'_>) -> bool {
    let value = element.value();
    let hidden_class = value.classes().any(|c| c == markers::HIDDEN_CLASS);
    let aria_hidden = value.attr("aria-hidden") == Some("true");
    let display_none = value
        .attr("style")
        .is_some_and(|style| style.replace(' ', "").contains("display:none"));
    !(hidden_class || aria_hidden || display_none)
}

fn is_focusable(element: ElementRef<'_>) -> bool {
    let value = element.value();
    let hidden_input = value.name() == "input" && value.attr("type") == Some("hidden");
    let removed = value.attr("tabindex").map(str::trim) == Some("-1");
    !(hidden_input || removed)
}
