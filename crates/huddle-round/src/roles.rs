//! Dealing secret roles and content at the start of a round.

use huddle_core::{ContentItem, ContentPool, Player, PlayerIndex, RoleAssignment};
use rand::Rng;
use tracing::debug;

use crate::{ConfigError, GameVariant, RoleMode};

/// Picks the special-role player and the round's content.
///
/// Pure apart from the random source the caller injects, so a seeded RNG
/// reproduces a deal exactly.
#[derive(Debug, Clone, Copy)]
pub struct RoleAssigner {
    variant: &'static str,
    role_mode: RoleMode,
    min_players: usize,
}

impl RoleAssigner {
    pub fn new(variant: &'static str, role_mode: RoleMode, min_players: usize) -> Self {
        Self {
            variant,
            role_mode,
            min_players,
        }
    }

    /// An assigner configured from `V`'s rules.
    pub fn for_variant<V: GameVariant>() -> Self {
        Self::new(V::name(), V::role_mode(), V::min_players())
    }

    /// Deals a round.
    ///
    /// The special index (when the variant has one) is uniform over all
    /// players. The content is uniform over the pool, except that the item
    /// whose text equals `previous` is excluded whenever anything else is
    /// left to draw; a single-item pool repeats.
    ///
    /// # Errors
    /// [`ConfigError::InsufficientContent`] for an empty pool and
    /// [`ConfigError::InsufficientPlayers`] below the variant minimum.
    pub fn assign<R: Rng + ?Sized>(
        &self,
        players: &[Player],
        pool: &ContentPool,
        previous: Option<&str>,
        rng: &mut R,
    ) -> Result<RoleAssignment, ConfigError> {
        if pool.is_empty() {
            return Err(ConfigError::InsufficientContent);
        }
        if players.len() < self.min_players {
            return Err(ConfigError::InsufficientPlayers {
                variant: self.variant,
                required: self.min_players,
                actual: players.len(),
            });
        }

        let special_index = match self.role_mode {
            RoleMode::SpecialRole => Some(PlayerIndex(rng.random_range(0..players.len()))),
            RoleMode::Shared => None,
        };

        let item = draw_content(pool, previous, rng);
        debug!(
            variant = self.variant,
            special = ?special_index,
            pool = pool.len(),
            "roles assigned"
        );

        Ok(RoleAssignment {
            special_index,
            content: item.text.clone(),
            answer: item.answer.clone(),
        })
    }
}

fn draw_content<'a, R: Rng + ?Sized>(
    pool: &'a ContentPool,
    previous: Option<&str>,
    rng: &mut R,
) -> &'a ContentItem {
    let items = pool.items();
    let fresh: Vec<&ContentItem> = match previous {
        Some(prev) => items.iter().filter(|i| i.text != prev).collect(),
        None => Vec::new(),
    };
    if fresh.is_empty() {
        // Nothing new left (or no history): draw from everything.
        &items[rng.random_range(0..items.len())]
    } else {
        fresh[rng.random_range(0..fresh.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImpostorDrawing, WrongAnswer};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn players(n: usize) -> Vec<Player> {
        (0..n).map(|i| Player::new(i, format!("P{i}"))).collect()
    }

    #[test]
    fn test_special_role_is_valid_index() {
        let assigner = RoleAssigner::for_variant::<ImpostorDrawing>();
        let pool = ContentPool::words(["kite", "boat", "lamp"]);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let a = assigner.assign(&players(5), &pool, None, &mut rng).unwrap();
            let special = a.special_index.expect("impostor variant deals a special role");
            assert!(special.get() < 5);
            assert_eq!(a.answer, None);
        }
    }

    #[test]
    fn test_shared_mode_has_no_special_role() {
        let assigner = RoleAssigner::for_variant::<WrongAnswer>();
        let pool = ContentPool::new(vec![ContentItem::question("2 + 2?", "4")]);
        let mut rng = StdRng::seed_from_u64(2);
        let a = assigner.assign(&players(2), &pool, None, &mut rng).unwrap();
        assert_eq!(a.special_index, None);
        assert_eq!(a.content, "2 + 2?");
        assert_eq!(a.answer.as_deref(), Some("4"));
    }

    #[test]
    fn test_same_seed_same_deal() {
        let assigner = RoleAssigner::for_variant::<ImpostorDrawing>();
        let pool = ContentPool::words(["a", "b", "c", "d", "e"]);
        let a = assigner
            .assign(&players(4), &pool, None, &mut StdRng::seed_from_u64(99))
            .unwrap();
        let b = assigner
            .assign(&players(4), &pool, None, &mut StdRng::seed_from_u64(99))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_never_repeats_previous_when_alternatives_exist() {
        let assigner = RoleAssigner::for_variant::<ImpostorDrawing>();
        let pool = ContentPool::words(["kite", "boat"]);
        let mut rng = StdRng::seed_from_u64(3);
        let mut previous = "kite".to_string();
        for _ in 0..100 {
            let a = assigner
                .assign(&players(3), &pool, Some(&previous), &mut rng)
                .unwrap();
            assert_ne!(a.content, previous);
            previous = a.content;
        }
    }

    #[test]
    fn test_single_item_pool_repeats() {
        let assigner = RoleAssigner::for_variant::<ImpostorDrawing>();
        let pool = ContentPool::words(["kite"]);
        let mut rng = StdRng::seed_from_u64(4);
        let a = assigner
            .assign(&players(3), &pool, Some("kite"), &mut rng)
            .unwrap();
        assert_eq!(a.content, "kite");
    }

    #[test]
    fn test_empty_pool_fails() {
        let assigner = RoleAssigner::for_variant::<ImpostorDrawing>();
        let mut rng = StdRng::seed_from_u64(5);
        let err = assigner
            .assign(&players(3), &ContentPool::default(), None, &mut rng)
            .unwrap_err();
        assert_eq!(err, ConfigError::InsufficientContent);
    }

    #[test]
    fn test_too_few_players_fails() {
        let assigner = RoleAssigner::for_variant::<ImpostorDrawing>();
        let mut rng = StdRng::seed_from_u64(6);
        let err = assigner
            .assign(&players(2), &ContentPool::words(["kite"]), None, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InsufficientPlayers { required: 3, actual: 2, .. }
        ));
    }
}
