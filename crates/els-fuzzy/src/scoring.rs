/// How a candidate matched. Prefix matches order above fuzzy ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    /// Query characters appear in order, with gaps.
    Fuzzy,
    /// Candidate starts with the query (ASCII case-insensitive).
    Prefix,
}

/// Orders by kind first, then by score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchScore {
    pub kind: MatchKind,
    pub score: i32,
}

const PER_CHAR: i32 = 10;
const SEGMENT_START: i32 = 12;
const ADJACENT: i32 = 6;
const SAME_CASE: i32 = 1;

/// Characters that split template identifiers: `foo-bar`, `Foo::Bar`, `this.x`, `@arg`.
fn splits_segments(b: u8) -> bool {
    matches!(b, b'-' | b'_' | b'/' | b'.' | b':' | b'@' | b'$' | b' ')
}

fn starts_segment(candidate: &[u8], at: usize) -> bool {
    match at.checked_sub(1).map(|prev| candidate[prev]) {
        None => true,
        Some(prev) => {
            splits_segments(prev)
                || (prev.is_ascii_lowercase() && candidate[at].is_ascii_uppercase())
        }
    }
}

fn to_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn prefix_score(query: &[u8], candidate: &[u8]) -> Option<i32> {
    let head = candidate.get(..query.len())?;
    if !head.eq_ignore_ascii_case(query) {
        return None;
    }
    let same_case = query.iter().zip(head).filter(|(q, c)| q == c).count();
    let score = to_i32(query.len()) * PER_CHAR + to_i32(same_case) * SAME_CASE;
    // Shorter candidates are closer to what was typed.
    Some(score.saturating_sub(to_i32(candidate.len() - query.len())))
}

fn is_subsequence(query: &[u8], candidate: &[u8]) -> bool {
    let mut rest = candidate.iter();
    query
        .iter()
        .all(|q| rest.any(|c| c.eq_ignore_ascii_case(q)))
}

/// Greedy left-to-right subsequence match. A query byte whose next hit is
/// mid-segment moves to a later segment start when the rest still matches.
fn subsequence_score(query: &[u8], candidate: &[u8]) -> Option<i32> {
    let mut score = 0i32;
    let mut pos = 0usize;
    let mut last: Option<usize> = None;

    for (qi, &q) in query.iter().enumerate() {
        let rest = candidate.get(pos..)?;
        let plain = rest.iter().position(|c| c.eq_ignore_ascii_case(&q))? + pos;
        let adjacent = last.is_some_and(|last| last + 1 == plain);
        let at = if adjacent || starts_segment(candidate, plain) {
            plain
        } else {
            let remaining = &query[qi + 1..];
            (plain + 1..candidate.len())
                .find(|&i| {
                    candidate[i].eq_ignore_ascii_case(&q)
                        && starts_segment(candidate, i)
                        && is_subsequence(remaining, &candidate[i + 1..])
                })
                .unwrap_or(plain)
        };

        score += PER_CHAR;
        if starts_segment(candidate, at) {
            score += SEGMENT_START;
        }
        if candidate[at] == q {
            score += SAME_CASE;
        }
        match last {
            Some(last) if last + 1 == at => score += ADJACENT,
            Some(last) => score -= to_i32(at - last - 1),
            None => score -= to_i32(at),
        }
        last = Some(at);
        pos = at + 1;
    }
    Some(score)
}

/// Score `candidate` against `query`.
///
/// Returns `None` when `query` is not a case-insensitive subsequence of
/// `candidate`. An empty query matches everything as a zero-score prefix.
pub fn fuzzy_match(query: &str, candidate: &str) -> Option<MatchScore> {
    let (query, candidate) = (query.as_bytes(), candidate.as_bytes());
    if query.is_empty() {
        return Some(MatchScore {
            kind: MatchKind::Prefix,
            score: 0,
        });
    }
    if let Some(score) = prefix_score(query, candidate) {
        return Some(MatchScore {
            kind: MatchKind::Prefix,
            score,
        });
    }
    subsequence_score(query, candidate).map(|score| MatchScore {
        kind: MatchKind::Fuzzy,
        score,
    })
}
