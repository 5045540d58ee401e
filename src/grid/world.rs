//! Grid world model: tiles, entities, and the transition function
//!
//! The world exposes the narrow interface the searchers consume: cell
//! predicates, bounds, entity lookups, queued moves, and a [`step`]
//! transition that returns the next world together with the set of
//! discrete events the transition produced. Worlds are deep-copied for
//! hypothetical lookahead; [`step`] never mutates the receiver.
//!
//! [`step`]: GridWorld::step

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::monster::MonsterPolicy;

/// A cell coordinate, `(x, y)` with `y = 0` at the top row.
pub type Coord = (i32, i32);

/// Static content of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Empty,
    Wall,
    Exit,
}

/// Discrete outcome tags produced by one transition.
///
/// Consumed at the current ply only; never stored across steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    BlastHitCharacter,
    BlastHitMonster,
    BlastHitWall,
    CharacterKilledByMonster,
    CharacterReachedExit,
}

/// A character action: a one-cell displacement in `{-1,0,1}²` plus an
/// optional bomb drop at the pre-move cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridMove {
    pub dx: i32,
    pub dy: i32,
    pub place_bomb: bool,
}

impl GridMove {
    /// The designated no-movement action.
    pub fn stay() -> Self {
        GridMove {
            dx: 0,
            dy: 0,
            place_bomb: false,
        }
    }

    pub fn walk(dx: i32, dy: i32) -> Self {
        GridMove {
            dx,
            dy,
            place_bomb: false,
        }
    }
}

/// A planted bomb counting down to detonation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bomb {
    pub x: i32,
    pub y: i32,
    pub timer: u32,
}

/// A blast cell left by a detonation, fatal while it lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blast {
    pub x: i32,
    pub y: i32,
    pub ttl: u32,
}

/// The player-controlled agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub x: i32,
    pub y: i32,
    queued: (i32, i32),
    queued_bomb: bool,
}

/// A hostile entity driven by a [`MonsterPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub x: i32,
    pub y: i32,
    pub policy: MonsterPolicy,
    queued: (i32, i32),
}

/// Ticks a fresh bomb waits before detonating.
pub const BOMB_TIMER: u32 = 10;

/// Ticks a blast cell stays fatal.
pub const BLAST_TTL: u32 = 2;

/// How far a blast reaches along each cardinal direction.
pub const BLAST_RADIUS: i32 = 4;

/// The grid world state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridWorld {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    character: Option<Character>,
    monsters: Vec<Monster>,
    bombs: Vec<Bomb>,
    blasts: Vec<Blast>,
    time_left: i32,
}

impl GridWorld {
    /// Create an empty world with the given time budget.
    pub fn new(width: usize, height: usize, time_budget: i32) -> Self {
        GridWorld {
            width,
            height,
            tiles: vec![Tile::Empty; width * height],
            character: None,
            monsters: Vec::new(),
            bombs: Vec::new(),
            blasts: Vec::new(),
            time_left: time_budget,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn time_left(&self) -> i32 {
        self.time_left
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width + x as usize
    }

    /// Tile at `(x, y)`; out-of-bounds cells read as walls.
    pub fn tile(&self, x: i32, y: i32) -> Tile {
        if self.in_bounds(x, y) {
            self.tiles[self.index(x, y)]
        } else {
            Tile::Wall
        }
    }

    pub fn wall_at(&self, x: i32, y: i32) -> bool {
        self.tile(x, y) == Tile::Wall
    }

    pub fn exit_at(&self, x: i32, y: i32) -> bool {
        self.tile(x, y) == Tile::Exit
    }

    pub fn empty_at(&self, x: i32, y: i32) -> bool {
        self.tile(x, y) == Tile::Empty
    }

    pub fn bomb_at(&self, x: i32, y: i32) -> Option<&Bomb> {
        self.bombs.iter().find(|b| b.x == x && b.y == y)
    }

    pub fn blast_at(&self, x: i32, y: i32) -> Option<&Blast> {
        self.blasts.iter().find(|b| b.x == x && b.y == y)
    }

    pub fn monster_at(&self, x: i32, y: i32) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.x == x && m.y == y)
    }

    pub fn character(&self) -> Option<&Character> {
        self.character.as_ref()
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn blasts(&self) -> &[Blast] {
        &self.blasts
    }

    /// First exit tile in scan order, if the world has one.
    pub fn exit_position(&self) -> Option<Coord> {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if self.exit_at(x, y) {
                    return Some((x, y));
                }
            }
        }
        None
    }

    /// The monster nearest to `(x, y)` by Manhattan distance.
    pub fn nearest_monster(&self, x: i32, y: i32) -> Option<&Monster> {
        self.monsters
            .iter()
            .min_by_key(|m| (m.x - x).abs() + (m.y - y).abs())
    }

    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) -> crate::Result<()> {
        if !self.in_bounds(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        let idx = self.index(x, y);
        self.tiles[idx] = tile;
        Ok(())
    }

    pub fn place_character(&mut self, x: i32, y: i32) -> crate::Result<()> {
        if !self.in_bounds(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        self.character = Some(Character {
            x,
            y,
            queued: (0, 0),
            queued_bomb: false,
        });
        Ok(())
    }

    pub fn place_monster(&mut self, x: i32, y: i32, policy: MonsterPolicy) -> crate::Result<()> {
        if !self.in_bounds(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        self.monsters.push(Monster {
            x,
            y,
            policy,
            queued: (0, 0),
        });
        Ok(())
    }

    /// Plant a bomb directly, for scenario setup. In play the character
    /// drops bombs through [`queue_character_move`].
    ///
    /// [`queue_character_move`]: GridWorld::queue_character_move
    pub fn plant_bomb(&mut self, x: i32, y: i32, timer: u32) -> crate::Result<()> {
        if !self.in_bounds(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        self.bombs.push(Bomb { x, y, timer });
        Ok(())
    }

    fn out_of_bounds(&self, x: i32, y: i32) -> crate::Error {
        crate::Error::CellOutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    /// Queue the character's action for the next [`step`]: a one-cell
    /// displacement plus an optional bomb drop at the current position.
    ///
    /// [`step`]: GridWorld::step
    pub fn queue_character_move(&mut self, dx: i32, dy: i32, place_bomb: bool) -> crate::Result<()> {
        let character = self.character.as_mut().ok_or(crate::Error::NoCharacter)?;
        character.queued = (dx.clamp(-1, 1), dy.clamp(-1, 1));
        character.queued_bomb = place_bomb;
        Ok(())
    }

    /// Queue a monster's displacement for the next [`step`].
    ///
    /// [`step`]: GridWorld::step
    pub fn queue_monster_move(&mut self, index: usize, dx: i32, dy: i32) -> crate::Result<()> {
        let count = self.monsters.len();
        let monster = self
            .monsters
            .get_mut(index)
            .ok_or(crate::Error::UnknownMonster { index, count })?;
        monster.queued = (dx.clamp(-1, 1), dy.clamp(-1, 1));
        Ok(())
    }

    /// Apply every queued action and advance time by one tick.
    ///
    /// Returns the successor world and the events the transition produced.
    /// The receiver is left untouched, so callers can branch on several
    /// queued alternatives from one saved state.
    pub fn step(&self) -> (GridWorld, HashSet<Event>) {
        let mut next = self.clone();
        let mut events = HashSet::new();

        next.time_left -= 1;

        // Age out old blasts before new detonations land.
        for blast in &mut next.blasts {
            blast.ttl -= 1;
        }
        next.blasts.retain(|b| b.ttl > 0);

        // Tick bombs and detonate the expired ones.
        for bomb in &mut next.bombs {
            bomb.timer = bomb.timer.saturating_sub(1);
        }
        let (expired, ticking): (Vec<Bomb>, Vec<Bomb>) =
            next.bombs.drain(..).partition(|b| b.timer == 0);
        next.bombs = ticking;
        for bomb in expired {
            next.detonate(bomb.x, bomb.y, &mut events);
        }

        // Character action: bomb drop happens at the pre-move position.
        if let Some(mut character) = next.character.take() {
            if character.queued_bomb {
                next.bombs.push(Bomb {
                    x: character.x,
                    y: character.y,
                    timer: BOMB_TIMER,
                });
            }
            let (dx, dy) = character.queued;
            let (tx, ty) = (character.x + dx, character.y + dy);
            if next.in_bounds(tx, ty) && !next.wall_at(tx, ty) {
                character.x = tx;
                character.y = ty;
            }
            character.queued = (0, 0);
            character.queued_bomb = false;
            next.character = Some(character);
        }

        // Monster moves, blocked by walls and bounds.
        for monster in &mut next.monsters {
            let (dx, dy) = monster.queued;
            let (tx, ty) = (monster.x + dx, monster.y + dy);
            let blocked =
                tx < 0 || tx >= next.width as i32 || ty < 0 || ty >= next.height as i32 || {
                    next.tiles[ty as usize * next.width + tx as usize] == Tile::Wall
                };
            if !blocked {
                monster.x = tx;
                monster.y = ty;
            }
            monster.queued = (0, 0);
        }

        next.resolve_collisions(&mut events);
        (next, events)
    }

    /// Spawn a blast cross centered at `(x, y)`, stopping at walls and
    /// consuming the wall cell it stops on.
    fn detonate(&mut self, x: i32, y: i32, events: &mut HashSet<Event>) {
        self.blasts.push(Blast { x, y, ttl: BLAST_TTL });
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            for reach in 1..=BLAST_RADIUS {
                let (bx, by) = (x + dx * reach, y + dy * reach);
                if !self.in_bounds(bx, by) {
                    break;
                }
                let hit_wall = self.wall_at(bx, by);
                if hit_wall {
                    let idx = self.index(bx, by);
                    self.tiles[idx] = Tile::Empty;
                    events.insert(Event::BlastHitWall);
                }
                self.blasts.push(Blast {
                    x: bx,
                    y: by,
                    ttl: BLAST_TTL,
                });
                if hit_wall {
                    break;
                }
            }
        }
    }

    fn resolve_collisions(&mut self, events: &mut HashSet<Event>) {
        // Monsters caught in a blast
        let mut survivors = Vec::with_capacity(self.monsters.len());
        for monster in self.monsters.drain(..) {
            if self
                .blasts
                .iter()
                .any(|b| b.x == monster.x && b.y == monster.y)
            {
                events.insert(Event::BlastHitMonster);
            } else {
                survivors.push(monster);
            }
        }
        self.monsters = survivors;

        if let Some(character) = self.character {
            if self
                .blasts
                .iter()
                .any(|b| b.x == character.x && b.y == character.y)
            {
                events.insert(Event::BlastHitCharacter);
                self.character = None;
            } else if self
                .monsters
                .iter()
                .any(|m| m.x == character.x && m.y == character.y)
            {
                events.insert(Event::CharacterKilledByMonster);
                self.character = None;
            } else if self.exit_at(character.x, character.y) {
                events.insert(Event::CharacterReachedExit);
                self.character = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_world() -> GridWorld {
        GridWorld::new(5, 5, 100)
    }

    #[test]
    fn character_moves_one_cell() {
        let mut world = open_world();
        world.place_character(0, 0).unwrap();
        world.queue_character_move(1, 1, false).unwrap();
        let (next, events) = world.step();
        let c = next.character().unwrap();
        assert_eq!((c.x, c.y), (1, 1));
        assert!(events.is_empty());
        assert_eq!(next.time_left(), 99);
        // The original world is untouched
        let original = world.character().unwrap();
        assert_eq!((original.x, original.y), (0, 0));
    }

    #[test]
    fn walls_block_movement() {
        let mut world = open_world();
        world.place_character(0, 0).unwrap();
        world.set_tile(1, 0, Tile::Wall).unwrap();
        world.queue_character_move(1, 0, false).unwrap();
        let (next, _) = world.step();
        let c = next.character().unwrap();
        assert_eq!((c.x, c.y), (0, 0));
    }

    #[test]
    fn bounds_block_movement() {
        let mut world = open_world();
        world.place_character(0, 0).unwrap();
        world.queue_character_move(-1, 0, false).unwrap();
        let (next, _) = world.step();
        assert_eq!(next.character().unwrap().x, 0);
    }

    #[test]
    fn reaching_the_exit_emits_the_event() {
        let mut world = open_world();
        world.set_tile(1, 0, Tile::Exit).unwrap();
        world.place_character(0, 0).unwrap();
        world.queue_character_move(1, 0, false).unwrap();
        let (next, events) = world.step();
        assert!(events.contains(&Event::CharacterReachedExit));
        assert!(next.character().is_none());
    }

    #[test]
    fn monster_contact_kills_the_character() {
        let mut world = open_world();
        world.place_character(0, 0).unwrap();
        world.place_monster(1, 1, MonsterPolicy::Wander).unwrap();
        world.queue_monster_move(0, -1, -1).unwrap();
        let (next, events) = world.step();
        assert!(events.contains(&Event::CharacterKilledByMonster));
        assert!(next.character().is_none());
    }

    #[test]
    fn bomb_counts_down_and_detonates() {
        let mut world = open_world();
        world.place_character(2, 2).unwrap();
        world.queue_character_move(0, 0, true).unwrap();
        let (mut current, _) = world.step();
        assert!(current.bomb_at(2, 2).is_some());

        // Walk the character clear, then let the timer run out.
        current.queue_character_move(1, 1, false).unwrap();
        let (mut current, _) = current.step();
        current.queue_character_move(1, 1, false).unwrap();
        let (mut current, _) = current.step();
        for _ in 0..BOMB_TIMER {
            if current.bombs().is_empty() {
                break;
            }
            let (next, _) = current.step();
            current = next;
        }
        assert!(current.bombs().is_empty());
        assert!(current.blast_at(2, 2).is_some(), "blast should cover the bomb cell");
        assert!(current.blast_at(2, 4).is_some(), "blast should reach along the cross");
        assert!(current.character().is_some(), "character stood clear of the cross");
    }

    #[test]
    fn blast_stops_at_walls_and_consumes_them() {
        let mut world = open_world();
        world.set_tile(3, 2, Tile::Wall).unwrap();
        world.set_tile(4, 2, Tile::Wall).unwrap();
        world.place_character(0, 0).unwrap();
        world.plant_bomb(2, 2, 1).unwrap();
        let (next, events) = world.step();
        assert!(events.contains(&Event::BlastHitWall));
        assert!(next.blast_at(3, 2).is_some(), "blast covers the wall it broke");
        assert!(next.wall_at(4, 2), "the wall behind survives");
        assert!(next.blast_at(4, 2).is_none());
        assert!(!next.wall_at(3, 2), "the hit wall is consumed");
    }

    #[test]
    fn nearest_monster_uses_manhattan_distance() {
        let mut world = open_world();
        world.place_monster(4, 4, MonsterPolicy::Wander).unwrap();
        world.place_monster(1, 0, MonsterPolicy::Pursuit).unwrap();
        let nearest = world.nearest_monster(0, 0).unwrap();
        assert_eq!((nearest.x, nearest.y), (1, 0));
    }
}
