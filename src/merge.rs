//! Delimiter-based HTML merging
//!
//! [`merge_documents`] splices the `<head>` and `<body>` interiors of a
//! fetched document into a locally supplied template. The merge is a literal
//! text operation, not a parser: nested or duplicate markers, case variants
//! and self-closing tags all defeat it. It lives behind this module boundary
//! so a real parser could replace it without touching the fetch manager.

use crate::error::MergeError;

const HEAD_OPEN: &str = "<head>";
const HEAD_CLOSE: &str = "</head>";
const BODY_OPEN: &str = "<body>";
const BODY_OPEN_PARTIAL: &str = "<body";
const BODY_CLOSE: &str = "</body>";

/// Merge a fetched HTML document into a local template
///
/// Two splice passes run in order, each hard-failing the whole merge when
/// its delimiters are missing:
///
/// 1. **Head splice**: the template and the fetched document are both split
///    on the first literal `<head>`. The fetched side's content up to its
///    `</head>` (or to its end, if `</head>` is absent) is inserted after
///    the template's `<head>` plus a newline. Everything the template had
///    after its own `<head>` marker (its head interior, `</head>`, and the
///    rest of the document) is preserved verbatim after the spliced
///    content, which is how template styling and scripts survive.
/// 2. **Body splice**: operates on the result of step 1, split on the exact
///    marker `<body>`. The fetched document is split on `<body` (no closing
///    bracket), so attributes on the fetched body tag ride along with its
///    content, up to the fetched `</body>` (or to its end, if absent).
///
/// The merged document therefore carries the fetched page's head interior,
/// body attributes and body interior inside the template's outer shell.
///
/// # Errors
///
/// [`MergeError::HeadNotFound`] when either input lacks `<head>`;
/// [`MergeError::BodyNotFound`] when the step-1 result lacks `<body>` or the
/// fetched document lacks `<body`. No partial document is produced.
pub fn merge_documents(template: &str, fetched: &str) -> Result<String, MergeError> {
    // move the fetched <head> interior into the template
    let (head_prefix, head_suffix) = template
        .split_once(HEAD_OPEN)
        .ok_or(MergeError::HeadNotFound)?;
    let (_, fetched_head) = fetched
        .split_once(HEAD_OPEN)
        .ok_or(MergeError::HeadNotFound)?;
    let head_content = fetched_head
        .split_once(HEAD_CLOSE)
        .map_or(fetched_head, |(content, _)| content);

    let merged = format!("{head_prefix}{HEAD_OPEN}\n{head_content}{head_suffix}");

    // move the fetched <body> attributes and interior into the step-1 result
    let (body_prefix, body_suffix) = merged
        .split_once(BODY_OPEN)
        .ok_or(MergeError::BodyNotFound)?;
    let (_, fetched_body) = fetched
        .split_once(BODY_OPEN_PARTIAL)
        .ok_or(MergeError::BodyNotFound)?;
    let body_content = fetched_body
        .split_once(BODY_CLOSE)
        .map_or(fetched_body, |(content, _)| content);

    Ok(format!(
        "{body_prefix}{BODY_OPEN_PARTIAL}{body_content}{body_suffix}"
    ))
}
