/// `CharFilter` - Iterator that filters out strings and comments
///
/// Wraps a string iterator and keeps track of whether we are inside a string
/// literal, a `//` line comment or a `/* */` block comment. It is used
/// throughout the codebase so that brackets, terminators and keywords are only
/// ever recognised in real Verilog code.

/// Iterator adapter that filters out strings and comments
///
/// Yields (byte position, character) pairs. Positions always refer to the
/// original input, so callers can slice the source with them.
pub struct CharFilter<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    state: FilterState,
    /// Second half of a two-character comment delimiter waiting to be yielded
    pending: Option<(usize, char)>,
    filter_comments: bool,
    filter_strings: bool,
}

#[derive(Debug, Default, Clone, Copy)]
struct FilterState {
    instring: bool,
    escaped: bool,
    in_line_comment: bool,
    in_block_comment: bool,
}

impl<'a> CharFilter<'a> {
    /// Create a new `CharFilter`
    ///
    /// # Arguments
    /// * `content` - The string to iterate over
    /// * `filter_comments` - Whether to filter out `//` and `/* */` comments
    /// * `filter_strings` - Whether to filter out string literals (quotes included)
    #[must_use]
    pub fn new(content: &'a str, filter_comments: bool, filter_strings: bool) -> Self {
        Self::with_comment_state(content, filter_comments, filter_strings, false)
    }

    /// Create a `CharFilter` that starts inside a block comment
    ///
    /// Used when a `/* */` comment spans several lines.
    #[must_use]
    pub fn with_comment_state(
        content: &'a str,
        filter_comments: bool,
        filter_strings: bool,
        in_block_comment: bool,
    ) -> Self {
        Self {
            chars: content.char_indices().peekable(),
            state: FilterState {
                in_block_comment,
                ..FilterState::default()
            },
            pending: None,
            filter_comments,
            filter_strings,
        }
    }

    /// Check if we're currently inside a string
    #[must_use]
    pub fn instring(&self) -> bool {
        self.state.instring
    }

    /// Check if the iterator stopped inside an unterminated block comment
    #[must_use]
    pub fn in_block_comment(&self) -> bool {
        self.state.in_block_comment
    }

    /// Get the filtered content as a string
    pub fn filter_all(&mut self) -> String {
        let size_hint = self.chars.size_hint().0;
        let mut result = String::with_capacity(size_hint);
        for (_, c) in self.by_ref() {
            result.push(c);
        }
        result
    }

    /// Peek at the next character without consuming
    fn peek_next_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }
}

impl Iterator for CharFilter<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.pending.take() {
            return Some(item);
        }

        loop {
            let (pos, c) = self.chars.next()?;

            if self.state.in_line_comment {
                if self.filter_comments {
                    continue;
                }
                return Some((pos, c));
            }

            if self.state.in_block_comment {
                if c == '*' && self.peek_next_char() == Some('/') {
                    self.state.in_block_comment = false;
                    let close = self.chars.next();
                    if self.filter_comments {
                        continue;
                    }
                    self.pending = close;
                    return Some((pos, c));
                }
                if self.filter_comments {
                    continue;
                }
                return Some((pos, c));
            }

            if self.state.instring {
                if self.state.escaped {
                    self.state.escaped = false;
                } else if c == '\\' {
                    self.state.escaped = true;
                } else if c == '"' {
                    self.state.instring = false;
                }
                if self.filter_strings {
                    continue;
                }
                return Some((pos, c));
            }

            if c == '/' {
                match self.peek_next_char() {
                    Some('/') => {
                        self.state.in_line_comment = true;
                        if self.filter_comments {
                            continue;
                        }
                        return Some((pos, c));
                    }
                    Some('*') => {
                        self.state.in_block_comment = true;
                        // Consume the '*' so "/*/" is not read as open-then-close
                        let star = self.chars.next();
                        if self.filter_comments {
                            continue;
                        }
                        self.pending = star;
                        return Some((pos, c));
                    }
                    _ => {}
                }
            }

            if c == '"' {
                self.state.instring = true;
                if self.filter_strings {
                    continue;
                }
            }

            return Some((pos, c));
        }
    }
}

/// Return only the code characters of a line (no strings, no comments)
#[must_use]
pub fn code_only(line: &str) -> String {
    CharFilter::new(line, true, true).filter_all()
}

/// Replace every string and comment character with spaces
///
/// Byte offsets of the result match the input, so regex matches on the masked
/// text can be used to slice the original line.
#[must_use]
pub fn mask_non_code(line: &str) -> String {
    let mut masked = String::with_capacity(line.len());
    let mut code = CharFilter::new(line, true, true).peekable();
    for (pos, c) in line.char_indices() {
        if code.peek().is_some_and(|&(p, _)| p == pos) {
            code.next();
            masked.push(c);
        } else {
            masked.extend(std::iter::repeat(' ').take(c.len_utf8()));
        }
    }
    masked
}
