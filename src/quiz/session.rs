//! Questions and streak scoring

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::deck::Deck;
use super::flags::{FlagEntry, parse_flags};
use super::{OPTION_COUNT, QuizError};
use crate::highscores::{BestScore, QUIZ_BEST_KEY};
use crate::platform::KeyValueStore;

/// What is shown and what is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// Country name shown, pick among flags
    CountryToFlag,
    /// Flag shown, pick among country names
    FlagToCountry,
}

/// One quiz question; all indices refer to the flag catalogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub kind: QuestionKind,
    pub correct: usize,
    /// Distinct flags in display order, `correct` among them
    pub options: [usize; OPTION_COUNT],
}

impl Question {
    /// Position of the correct flag among the options
    pub fn correct_option(&self) -> usize {
        self.options
            .iter()
            .position(|&o| o == self.correct)
            .unwrap_or_default()
    }
}

/// Result of answering the current question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// Option the player picked
    pub chosen: usize,
    /// Option that was right (highlighted either way)
    pub correct_option: usize,
    /// Streak after this answer
    pub streak: u32,
    /// This answer set a new best streak
    pub new_best: bool,
}

/// A run of questions with the current and best streak
pub struct QuizSession {
    flags: Vec<FlagEntry>,
    deck: Deck,
    rng: Pcg32,
    streak: u32,
    best: BestScore,
    current: Option<Question>,
}

impl QuizSession {
    pub fn new(
        flags: Vec<FlagEntry>,
        seed: u64,
        store: &(impl KeyValueStore + ?Sized),
    ) -> Result<Self, QuizError> {
        if flags.len() < OPTION_COUNT {
            return Err(QuizError::NotEnoughFlags(flags.len()));
        }
        let mut rng = Pcg32::seed_from_u64(seed);
        let deck = Deck::new(flags.len(), &mut rng);
        Ok(Self {
            flags,
            deck,
            rng,
            streak: 0,
            best: BestScore::load(store, QUIZ_BEST_KEY),
            current: None,
        })
    }

    /// Parse `flags.json` and start a session
    pub fn from_json(
        json: &str,
        seed: u64,
        store: &(impl KeyValueStore + ?Sized),
    ) -> Result<Self, QuizError> {
        Self::new(parse_flags(json)?, seed, store)
    }

    pub fn flags(&self) -> &[FlagEntry] {
        &self.flags
    }

    pub fn flag(&self, index: usize) -> Option<&FlagEntry> {
        self.flags.get(index)
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best(&self) -> u32 {
        self.best.value()
    }

    /// Question waiting for an answer
    pub fn current(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    /// Draw the next question, replacing any unanswered one
    pub fn next_question(&mut self) -> &Question {
        let kind = if self.rng.random_bool(0.5) {
            QuestionKind::CountryToFlag
        } else {
            QuestionKind::FlagToCountry
        };
        // Construction guarantees a non-empty deck
        let correct = self.deck.draw(&mut self.rng).unwrap_or_default();

        let mut options = [correct; OPTION_COUNT];
        let mut filled = 1;
        while filled < OPTION_COUNT {
            let pick = self.rng.random_range(0..self.flags.len());
            if !options[..filled].contains(&pick) {
                options[filled] = pick;
                filled += 1;
            }
        }
        options.shuffle(&mut self.rng);

        self.current.insert(Question {
            kind,
            correct,
            options,
        })
    }

    /// Answer the current question with the option at `chosen`
    ///
    /// Returns `None` when there is no open question or `chosen` is out of
    /// range. A question can be answered once.
    pub fn answer(
        &mut self,
        chosen: usize,
        store: &mut (impl KeyValueStore + ?Sized),
    ) -> Option<AnswerOutcome> {
        if chosen >= OPTION_COUNT {
            return None;
        }
        let question = self.current.take()?;
        let correct = question.options[chosen] == question.correct;

        let mut new_best = false;
        if correct {
            self.streak += 1;
            new_best = self.best.submit(self.streak, store);
        } else {
            self.streak = 0;
        }

        Some(AnswerOutcome {
            correct,
            chosen,
            correct_option: question.correct_option(),
            streak: self.streak,
            new_best,
        })
    }
}
