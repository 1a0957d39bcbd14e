//! Dinosaurs and their brains
//!
//! A `Dinosaur` is plain data. Its behaviour is a `DinoBrain` run through a
//! `StateMachine<DinoState>` that the world stores next to it.
//!
//! State rules:
//! - getting hit (`just_attacked`) always wins: `Attack` for one tick, then
//!   `Flee` until out of `runaway_distance`, then back to `Idle`
//! - an aggressive dinosaur that sees the player (longer sight at night)
//!   while no repellent is active gives `Chase`; losing sight goes `Idle`
//! - `Idle` occasionally starts a short `Wander` leg in a cardinal direction

use macroquad::math::Vec2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::DinosaurConfig;
use crate::engine::spatial_grid::Positioned;
use crate::engine::state_machine::{Behavior, Transition};
use crate::error::AiError;

use super::components::{Animation, Facing, Health};
use super::map::TileMap;

const ANIMATION_INTERVAL: f32 = 0.15;

const DIRECTIONS: [Vec2; 4] = [
    Vec2::new(1.0, 0.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, -1.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DinoState {
    Idle,
    Wander,
    Chase,
    Attack,
    Flee,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dinosaur {
    /// Tile coordinates
    pub x: f32,
    pub y: f32,
    /// Tiles per second
    pub speed: f32,
    pub facing: Facing,
    pub health: Health,
    pub aggressive: bool,
    /// Set by the collision pass when this dinosaur bit the player
    pub just_attacked: bool,
    #[serde(skip)]
    pub animation: Animation,
    #[serde(skip)]
    pub moving: bool,
    #[serde(skip)]
    wander_dir: Vec2,
    #[serde(skip)]
    wander_left: f32,
}

impl Dinosaur {
    pub fn new(x: f32, y: f32, aggressive: bool, config: &DinosaurConfig) -> Self {
        let speed = if aggressive {
            config.speed_aggressive
        } else {
            config.speed_normal
        };
        Self {
            x,
            y,
            speed,
            facing: Facing::Right,
            health: Health::new(config.max_health),
            aggressive,
            just_attacked: false,
            animation: Animation::default(),
            moving: false,
            wander_dir: Vec2::ZERO,
            wander_left: 0.0,
        }
    }

    pub fn tile(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }

    pub fn distance_to(&self, target: Vec2) -> f32 {
        self.position().distance(target)
    }

    /// Move by `delta` if the target tile is passable for dinosaurs.
    fn try_move(&mut self, delta: Vec2, map: &TileMap) -> bool {
        self.facing = self.facing.from_dx(delta.x);
        let (nx, ny) = (self.x + delta.x, self.y + delta.y);
        if !map.is_passable_for_dino(nx.floor() as i32, ny.floor() as i32) {
            return false;
        }
        self.x = nx;
        self.y = ny;
        self.moving = delta != Vec2::ZERO;
        true
    }
}

impl Positioned for Dinosaur {
    fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// What a dinosaur knows about the world this tick
pub struct AiContext<'a> {
    pub player: Vec2,
    pub repellent_active: bool,
    pub night: bool,
    pub map: &'a TileMap,
    pub config: &'a DinosaurConfig,
}

impl AiContext<'_> {
    fn sight(&self) -> f32 {
        if self.night {
            self.config.sight_night
        } else {
            self.config.sight_day
        }
    }

    fn sees_prey(&self, dino: &Dinosaur) -> bool {
        dino.aggressive && !self.repellent_active && dino.distance_to(self.player) <= self.sight()
    }
}

/// Shared behaviour for every dinosaur. Owns the RNG for idle rolls.
pub struct DinoBrain {
    rng: StdRng,
}

impl DinoBrain {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<'a> Behavior<Dinosaur, AiContext<'a>> for DinoBrain {
    type State = DinoState;

    fn enter(&mut self, state: DinoState, dino: &mut Dinosaur, ctx: &AiContext<'a>) {
        if state == DinoState::Wander {
            dino.wander_dir = DIRECTIONS.choose(&mut self.rng).copied().unwrap_or(Vec2::X);
            dino.wander_left = ctx.config.wander_time;
        }
    }

    fn exit(&mut self, state: DinoState, dino: &mut Dinosaur, _ctx: &AiContext<'a>) {
        if state == DinoState::Wander {
            dino.wander_left = 0.0;
        }
    }

    fn update(
        &mut self,
        state: DinoState,
        dino: &mut Dinosaur,
        ctx: &AiContext<'a>,
        dt: f32,
    ) -> Result<Transition<DinoState>, AiError> {
        if !dino.x.is_finite() || !dino.y.is_finite() {
            return Err(AiError::NonFinitePosition { x: dino.x, y: dino.y });
        }
        dino.moving = false;
        let result = match state {
            DinoState::Attack => Transition::To(DinoState::Flee),
            DinoState::Flee => {
                let away = (dino.position() - ctx.player).normalize_or_zero();
                dino.try_move(away * dino.speed * dt, ctx.map);
                if dino.distance_to(ctx.player) > ctx.config.runaway_distance {
                    dino.just_attacked = false;
                    Transition::To(DinoState::Idle)
                } else {
                    Transition::Stay
                }
            }
            _ if dino.just_attacked => Transition::To(DinoState::Attack),
            DinoState::Chase => {
                if ctx.sees_prey(dino) {
                    let toward = (ctx.player - dino.position()).normalize_or_zero();
                    dino.try_move(toward * dino.speed * dt, ctx.map);
                    Transition::Stay
                } else {
                    Transition::To(DinoState::Idle)
                }
            }
            DinoState::Idle => {
                if ctx.sees_prey(dino) {
                    Transition::To(DinoState::Chase)
                } else if self.rng.gen::<f32>() < ctx.config.random_move_chance {
                    Transition::To(DinoState::Wander)
                } else {
                    Transition::Stay
                }
            }
            DinoState::Wander => {
                if ctx.sees_prey(dino) {
                    Transition::To(DinoState::Chase)
                } else {
                    dino.try_move(dino.wander_dir * dino.speed * dt, ctx.map);
                    dino.wander_left -= dt;
                    if dino.wander_left <= 0.0 {
                        Transition::To(DinoState::Idle)
                    } else {
                        Transition::Stay
                    }
                }
            }
        };
        dino.animation.tick(dt, dino.moving, ANIMATION_INTERVAL, 2);
        Ok(result)
    }
}
