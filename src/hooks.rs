use std::rc::Rc;
use web_sys::{HtmlInputElement, KeyboardEvent};
use yew::prelude::*;

/// Parser from field text to a typed value.
pub type ParseFn<T> = Rc<dyn Fn(&str) -> Result<T, String>>;
/// Canonical text form of a typed value.
pub type FormatFn<T> = Rc<dyn Fn(&T) -> String>;

/// Text field bound to a value owned elsewhere (the raffle session).
#[derive(Clone)]
pub struct ValidatedInput {
    /// The current text content of the input field.
    pub text: String,
    /// An optional error message if the last commit failed to parse.
    pub error: Option<String>,
    /// Callback for the text input's `oninput` event.
    pub on_text_input: Callback<InputEvent>,
    /// Parse the current text and hand the value to the owner. Wired to blur.
    pub on_commit: Callback<FocusEvent>,
    /// Same as `on_commit`, but only for the Enter key.
    pub on_keydown: Callback<KeyboardEvent>,
}

/// Keep an editable text field in step with `current`.
///
/// Typing only changes the local text. Committing parses it; a good value is
/// emitted through `on_value` and the text snaps to its canonical form, a bad
/// one leaves the owner untouched and shows the error. Whenever `current`
/// changes from outside (claim, reset, clear), the text follows it.
#[hook]
pub fn use_validated_input<T: Clone + PartialEq + 'static>(
    current: T,
    parse: ParseFn<T>,
    format: FormatFn<T>,
    on_value: Callback<T>,
) -> ValidatedInput {
    let text_handle = use_state(|| format(&current));
    let error_handle = use_state(|| None::<String>);

    let on_text_input = {
        let text_setter = text_handle.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            text_setter.set(input.value());
        })
    };

    let commit = {
        let text_handle = text_handle.clone();
        let error_setter = error_handle.clone();
        let format = format.clone();
        Rc::new(move || match parse(text_handle.as_str()) {
            Ok(value) => {
                text_handle.set(format(&value));
                error_setter.set(None);
                on_value.emit(value);
            }
            Err(err_msg) => error_setter.set(Some(err_msg)),
        })
    };

    let on_commit = {
        let commit = commit.clone();
        Callback::from(move |_: FocusEvent| commit())
    };

    let on_keydown = Callback::from(move |e: KeyboardEvent| {
        if e.key() == "Enter" {
            commit();
        }
    });

    // Follow external changes to the owned value
    {
        let text_setter = text_handle.clone();
        let error_setter = error_handle.clone();
        use_effect_with(current, move |value| {
            let canonical = format(value);
            if *text_setter != canonical {
                text_setter.set(canonical);
            }
            error_setter.set(None);
            || ()
        });
    }

    ValidatedInput {
        text: (*text_handle).clone(),
        error: (*error_handle).clone(),
        on_text_input,
        on_commit,
        on_keydown,
    }
}
