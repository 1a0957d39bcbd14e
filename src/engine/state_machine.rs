//! Finite state machine driver
//!
//! The machine only tracks which state is current. What a state does lives
//! in a `Behavior`, which gets the agent and a read-only context and answers
//! with a `Transition`. On `To(next)` the machine runs `exit(old)` then
//! `enter(next)` and stops there: the new state first updates on the next
//! tick.

use std::fmt::Debug;

use crate::error::AiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    Stay,
    To(S),
}

pub trait Behavior<A, C> {
    type State: Copy + Eq + Debug;

    fn enter(&mut self, _state: Self::State, _agent: &mut A, _ctx: &C) {}
    fn exit(&mut self, _state: Self::State, _agent: &mut A, _ctx: &C) {}
    fn update(
        &mut self,
        state: Self::State,
        agent: &mut A,
        ctx: &C,
        dt: f32,
    ) -> Result<Transition<Self::State>, AiError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateMachine<S> {
    current: S,
    previous: Option<S>,
    time_in_state: f32,
}

impl<S: Copy + Eq + Debug> StateMachine<S> {
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            previous: None,
            time_in_state: 0.0,
        }
    }

    pub fn state(&self) -> S {
        self.current
    }

    pub fn previous(&self) -> Option<S> {
        self.previous
    }

    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    /// Run `enter` for the initial state.
    pub fn start<A, C, B>(&mut self, behavior: &mut B, agent: &mut A, ctx: &C)
    where
        B: Behavior<A, C, State = S>,
    {
        behavior.enter(self.current, agent, ctx);
    }

    /// One tick of the current state. Returns the new state if it changed.
    /// On error the machine keeps its current state.
    pub fn update<A, C, B>(
        &mut self,
        behavior: &mut B,
        agent: &mut A,
        ctx: &C,
        dt: f32,
    ) -> Result<Option<S>, AiError>
    where
        B: Behavior<A, C, State = S>,
    {
        self.time_in_state += dt;
        match behavior.update(self.current, agent, ctx, dt)? {
            Transition::Stay => Ok(None),
            Transition::To(next) => {
                self.change(behavior, agent, ctx, next);
                Ok(Some(next))
            }
        }
    }

    /// Switch state from outside, running exit/enter.
    pub fn change<A, C, B>(&mut self, behavior: &mut B, agent: &mut A, ctx: &C, next: S)
    where
        B: Behavior<A, C, State = S>,
    {
        behavior.exit(self.current, agent, ctx);
        self.previous = Some(self.current);
        self.current = next;
        self.time_in_state = 0.0;
        behavior.enter(next, agent, ctx);
    }

    /// Put the machine in `state` without running callbacks (restoring saves).
    pub fn set_state(&mut self, state: S) {
        self.current = state;
        self.previous = None;
        self.time_in_state = 0.0;
    }
}
