//! Review consensus - deriving a deed's disposition from reviewer votes
//!
//! Every review is an independent vote; their order carries no meaning. The
//! dispositions are evaluated independently of each other, so a deed can be
//! pending and have a review request at the same time. Only `Confirmed` and
//! `FalsePositive` exclude each other, which is why they are folded into a
//! single [`Verdict`].

use crate::record::{CovenantFlag, Review};

/// Vote thresholds for settling a deed's verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusRule {
    /// Agreeing votes needed to settle
    pub min_agreeing: u64,

    /// Opposing votes tolerated while still settling
    pub max_dissenting: u64,
}

impl ConsensusRule {
    /// Two agreeing votes and no dissent
    pub const DEFAULT: ConsensusRule = ConsensusRule {
        min_agreeing: 2,
        max_dissenting: 0,
    };

    /// Apply the rule to a tally
    ///
    /// With `max_dissenting < min_agreeing` the two settled outcomes can never
    /// both hold.
    pub fn verdict(&self, tally: &ReviewTally) -> Verdict {
        if tally.positive >= self.min_agreeing && tally.negative <= self.max_dissenting {
            Verdict::Confirmed
        } else if tally.negative >= self.min_agreeing && tally.positive <= self.max_dissenting {
            Verdict::FalsePositive
        } else {
            Verdict::Unresolved
        }
    }
}

impl Default for ConsensusRule {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Settled (or not) covenant status of a deed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Reviewers agree the deed carries a restrictive covenant
    Confirmed,

    /// Reviewers agree the system flagged the deed wrongly
    FalsePositive,

    /// Not enough agreement either way
    Unresolved,
}

impl Verdict {
    /// Get the verdict name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Confirmed => "confirmed",
            Verdict::FalsePositive => "false_positive",
            Verdict::Unresolved => "unresolved",
        }
    }
}

/// Individual disposition labels reported on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Disposition {
    /// In the system-identified set
    Identified,
    /// See [`Verdict::Confirmed`]
    Confirmed,
    /// Has at least one unanswered review
    Pending,
    /// Has at least one review asking for a second opinion
    ReviewRequested,
    /// See [`Verdict::FalsePositive`]
    FalsePositive,
}

/// One reviewer's vote, stripped of everything the classifier ignores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewVote {
    /// Covenant answer
    pub flag: CovenantFlag,

    /// Second opinion requested
    pub review_required: bool,
}

impl ReviewVote {
    /// Create a vote
    pub fn new(flag: CovenantFlag, review_required: bool) -> Self {
        Self {
            flag,
            review_required,
        }
    }
}

impl From<&Review> for ReviewVote {
    fn from(review: &Review) -> Self {
        Self::new(review.is_restrictive_covenant, review.review_required)
    }
}

/// Vote counts for one deed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReviewTally {
    /// Reviews answering yes
    pub positive: u64,
    /// Reviews answering no
    pub negative: u64,
    /// Unanswered reviews
    pub unknown: u64,
    /// Reviews asking for a second opinion
    pub review_requested: u64,
}

impl ReviewTally {
    /// Count a deed's votes
    pub fn from_votes<'a, I>(votes: I) -> Self
    where
        I: IntoIterator<Item = &'a ReviewVote>,
    {
        votes.into_iter().fold(Self::default(), |mut tally, vote| {
            match vote.flag {
                CovenantFlag::Yes => tally.positive += 1,
                CovenantFlag::No => tally.negative += 1,
                CovenantFlag::Unknown => tally.unknown += 1,
            }
            if vote.review_required {
                tally.review_requested += 1;
            }
            tally
        })
    }

    /// Total number of reviews counted
    pub fn total(&self) -> u64 {
        self.positive + self.negative + self.unknown
    }
}

/// Everything the dashboard derives about one deed
///
/// `pending_reviews` and `review_requests` are review-row counts, while the
/// verdict is per deed. The headline pending and review-requested figures are
/// sums of those row counts, not deed counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeedDisposition {
    /// Present in the system-identified set
    pub identified: bool,

    /// Settled verdict
    pub verdict: Verdict,

    /// Number of unanswered reviews
    pub pending_reviews: u64,

    /// Number of reviews asking for a second opinion
    pub review_requests: u64,
}

impl DeedDisposition {
    /// Whether any review is unanswered
    pub fn is_pending(&self) -> bool {
        self.pending_reviews > 0
    }

    /// Whether any review asked for a second opinion
    pub fn is_review_requested(&self) -> bool {
        self.review_requests > 0
    }

    /// All labels that hold for this deed, in declaration order
    pub fn labels(&self) -> Vec<Disposition> {
        let mut labels = Vec::new();
        if self.identified {
            labels.push(Disposition::Identified);
        }
        if self.verdict == Verdict::Confirmed {
            labels.push(Disposition::Confirmed);
        }
        if self.is_pending() {
            labels.push(Disposition::Pending);
        }
        if self.is_review_requested() {
            labels.push(Disposition::ReviewRequested);
        }
        if self.verdict == Verdict::FalsePositive {
            labels.push(Disposition::FalsePositive);
        }
        labels
    }
}

/// Classify a deed with the default consensus rule
pub fn classify(identified: bool, votes: &[ReviewVote]) -> DeedDisposition {
    classify_with(ConsensusRule::DEFAULT, identified, votes)
}

/// Classify a deed with an explicit consensus rule
pub fn classify_with(rule: ConsensusRule, identified: bool, votes: &[ReviewVote]) -> DeedDisposition {
    let tally = ReviewTally::from_votes(votes);
    DeedDisposition {
        identified,
        verdict: rule.verdict(&tally),
        pending_reviews: tally.unknown,
        review_requests: tally.review_requested,
    }
}
