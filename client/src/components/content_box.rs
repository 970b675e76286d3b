//! Markdown editor wrapper used by the upload page.
//!
//! The caller owns the Markdown source and receives the rendered HTML through
//! a second signal kept in sync here. Toolbar buttons apply
//! [`markdown::apply_format`] to the current textarea selection; undo and
//! redo walk an [`EditHistory`].

use leptos::html::Textarea;
use leptos::prelude::*;

use crate::util::markdown::{self, EditHistory, Format};

#[component]
pub fn ContentBox(
    markdown: RwSignal<String>,
    html: RwSignal<String>,
    #[prop(optional, into)] placeholder: Option<String>,
) -> impl IntoView {
    let textarea = NodeRef::<Textarea>::new();
    let history = StoredValue::new(EditHistory::default());
    let can_undo = RwSignal::new(false);
    let can_redo = RwSignal::new(false);

    Effect::new(move || {
        html.set(markdown::render_html(&markdown.get()));
        // An external reset (form cleared after submit) drops the history.
        if markdown.with(String::is_empty) {
            history.update_value(EditHistory::clear);
        }
        sync_history_flags(history, can_undo, can_redo);
    });

    let replace_text = move |text: String, selection: Option<(usize, usize)>| {
        write_textarea(textarea, &text, selection);
        markdown.set(text);
        sync_history_flags(history, can_undo, can_redo);
    };

    let on_format = move |format: Format| {
        let current = markdown.get_untracked();
        let (start, end) = read_selection(textarea, &current);
        let edit = markdown::apply_format(&current, start, end, format);
        if edit.text == current {
            return;
        }
        history.update_value(|h| h.record(&current));
        replace_text(edit.text, Some((edit.start, edit.end)));
    };

    let on_undo = move |_| {
        let current = markdown.get_untracked();
        if let Some(previous) = history.try_update_value(|h| h.undo(&current)).flatten() {
            replace_text(previous, None);
        }
    };

    let on_redo = move |_| {
        let current = markdown.get_untracked();
        if let Some(next) = history.try_update_value(|h| h.redo(&current)).flatten() {
            replace_text(next, None);
        }
    };

    let on_input = move |ev| {
        let next = event_target_value(&ev);
        let previous = markdown.get_untracked();
        history.update_value(|h| h.record(&previous));
        markdown.set(next);
    };

    view! {
        <div class="content-box">
            <div class="content-box__toolbar" role="toolbar">
                {Format::ALL
                    .into_iter()
                    .map(|format| {
                        view! {
                            <button
                                type="button"
                                class="content-box__tool"
                                title=format.title()
                                on:click=move |_| on_format(format)
                            >
                                {format.label()}
                            </button>
                        }
                    })
                    .collect_view()}
                <span class="content-box__divider"></span>
                <button
                    type="button"
                    class="content-box__tool"
                    title="Undo"
                    disabled=move || !can_undo.get()
                    on:click=on_undo
                >
                    "↶"
                </button>
                <button
                    type="button"
                    class="content-box__tool"
                    title="Redo"
                    disabled=move || !can_redo.get()
                    on:click=on_redo
                >
                    "↷"
                </button>
            </div>
            <textarea
                class="content-box__input"
                node_ref=textarea
                rows="16"
                placeholder=placeholder.unwrap_or_else(|| "Write your article in Markdown...".to_owned())
                prop:value=move || markdown.get()
                on:input=on_input
            ></textarea>
            <div class="content-box__preview" inner_html=move || html.get()></div>
        </div>
    }
}

fn sync_history_flags(history: StoredValue<EditHistory>, can_undo: RwSignal<bool>, can_redo: RwSignal<bool>) {
    history.with_value(|h| {
        can_undo.set(h.can_undo());
        can_redo.set(h.can_redo());
    });
}

/// Current selection as byte offsets; the end of the text when unknown.
#[cfg(feature = "hydrate")]
fn read_selection(textarea: NodeRef<Textarea>, text: &str) -> (usize, usize) {
    let Some(el) = textarea.get_untracked() else {
        return (text.len(), text.len());
    };
    let start = el.selection_start().ok().flatten().unwrap_or(0) as usize;
    let end = el.selection_end().ok().flatten().unwrap_or(0) as usize;
    (markdown::utf16_to_byte(text, start), markdown::utf16_to_byte(text, end))
}

#[cfg(not(feature = "hydrate"))]
fn read_selection(_textarea: NodeRef<Textarea>, text: &str) -> (usize, usize) {
    (text.len(), text.len())
}

/// Write `text` straight into the element so the restored selection is not
/// lost when the bound value catches up.
#[cfg(feature = "hydrate")]
fn write_textarea(textarea: NodeRef<Textarea>, text: &str, selection: Option<(usize, usize)>) {
    let Some(el) = textarea.get_untracked() else {
        return;
    };
    el.set_value(text);
    let (start, end) = selection.unwrap_or((text.len(), text.len()));
    let start = u32::try_from(markdown::byte_to_utf16(text, start)).unwrap_or(u32::MAX);
    let end = u32::try_from(markdown::byte_to_utf16(text, end)).unwrap_or(u32::MAX);
    let _ = el.set_selection_range(start, end);
    let _ = el.focus();
}

#[cfg(not(feature = "hydrate"))]
fn write_textarea(_textarea: NodeRef<Textarea>, _text: &str, _selection: Option<(usize, usize)>) {}
