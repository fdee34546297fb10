/// Where the parser is within the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParserState {
    /// Discarding bytes until the first boundary line.
    Preamble,
    /// Just matched `--<token>`, deciding between a new part and the end.
    AfterBoundary,
    /// Saw `--<token>-`, expecting the second hyphen.
    ClosingHyphen,
    /// Saw `--<token>` plus CR, expecting LF.
    BoundaryLf,
    /// At the start of a header line.
    HeaderFieldStart,
    HeaderField,
    /// Right after the colon, one optional space is skipped here.
    HeaderValueStart,
    HeaderValue,
    /// Saw CR inside a header value, expecting LF.
    HeaderValueLf,
    /// Saw CR on an empty header line, expecting LF.
    HeadersEndLf,
    /// Streaming part data while scanning for the next delimiter.
    Data,
    /// Discarding bytes after the closing boundary.
    Epilogue,
    /// A fatal error occurred.
    Failed,
}
