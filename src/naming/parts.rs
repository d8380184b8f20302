/// Token-list builder for `[<head>] <body>` offering names.
///
/// Fragments are split on whitespace as they are pushed, so blank fragments
/// vanish and no doubled or bracket-adjacent spaces can reach the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
    head: Vec<String>,
    body: Vec<String>,
}

impl NameParts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn head(mut self, fragment: impl AsRef<str>) -> Self {
        push_tokens(&mut self.head, fragment.as_ref());
        self
    }

    pub fn body(mut self, fragment: impl AsRef<str>) -> Self {
        push_tokens(&mut self.body, fragment.as_ref());
        self
    }

    pub fn body_if(self, cond: bool, fragment: impl AsRef<str>) -> Self {
        if cond { self.body(fragment) } else { self }
    }

    pub fn build(&self) -> String {
        let head = format!("[{}]", self.head.join(" "));
        if self.body.is_empty() {
            head
        } else {
            format!("{head} {}", self.body.join(" "))
        }
    }
}

fn push_tokens(target: &mut Vec<String>, fragment: &str) {
    target.extend(fragment.split_whitespace().map(str::to_string));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fragments_leave_no_gaps() {
        let name = NameParts::new()
            .head("SR")
            .head("")
            .head(" HS  PL ")
            .body("Catalog  text")
            .body("")
            .body("Mon-Fri 9-17")
            .build();
        assert_eq!(name, "[SR HS PL] Catalog text Mon-Fri 9-17");
    }

    #[test]
    fn empty_body_has_no_trailing_space() {
        assert_eq!(NameParts::new().head("Parent DE").build(), "[Parent DE]");
    }

    #[test]
    fn conditional_pushes() {
        let name = NameParts::new()
            .head("IM")
            .body("x")
            .body_if(true, "solving")
            .build();
        assert_eq!(name, "[IM] x solving");
    }
}
