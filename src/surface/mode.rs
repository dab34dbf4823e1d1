//! Scoped navigation-mode switching.
//!
//! Some surfaces interpret a navigation offset differently depending on a
//! named mode; the empty mode is the global "offset into the document"
//! interpretation. `NavigationModeGuard` switches mode for the lifetime of
//! the guard and puts the previous mode back on drop.

use std::ops::{Deref, DerefMut};

use super::RenderingSurface;

pub struct NavigationModeGuard<'a> {
    surface: &'a mut dyn RenderingSurface,
    previous: String,
}

impl<'a> NavigationModeGuard<'a> {
    pub fn new(surface: &'a mut dyn RenderingSurface, mode: &str) -> Self {
        let previous = surface.navigation_mode();
        surface.set_navigation_mode(mode);
        Self { surface, previous }
    }
}

impl<'a> Deref for NavigationModeGuard<'a> {
    type Target = dyn RenderingSurface + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.surface
    }
}

impl<'a> DerefMut for NavigationModeGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.surface
    }
}

impl Drop for NavigationModeGuard<'_> {
    fn drop(&mut self) {
        self.surface.set_navigation_mode(&self.previous);
    }
}
