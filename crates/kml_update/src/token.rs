use std::fmt;

/// Name of the single key carried by the token.
pub const TOKEN_KEY: &str = "count";

/// Counter carried by the client between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(pub u64);

impl Token {
    /// Token issued with the initial document.
    pub const INITIAL: Token = Token(0);

    pub fn count(self) -> u64 {
        self.0
    }

    /// Finds `count=<n>` in a query string or `Cookie` header value.
    ///
    /// Pairs may be separated by `&` or `;`. Returns `None` when the key is
    /// missing or its value is not a non-negative integer.
    pub fn parse(raw: &str) -> Option<Token> {
        raw.split(['&', ';'])
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| key.trim() == TOKEN_KEY)
            .and_then(|(_, value)| value.trim().parse::<u64>().ok())
            .map(Token)
    }

    /// Picks the raw token text out of a request: the query string first,
    /// then the `Cookie` header. Returns whichever source carries the key.
    pub fn select_raw<'a>(query: Option<&'a str>, cookie: Option<&'a str>) -> Option<&'a str> {
        [query, cookie]
            .into_iter()
            .flatten()
            .find(|raw| has_token_key(raw))
    }

    /// Text for the `<cookie>` element and `Set-Cookie` header.
    pub fn directive(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TOKEN_KEY}={}", self.0)
    }
}

fn has_token_key(raw: &str) -> bool {
    raw.split(['&', ';'])
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(key, _)| key.trim() == TOKEN_KEY)
}
