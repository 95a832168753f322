use lifegrid_kernel::GridSimulation;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the simulation and produces output. It never mutates
/// the grid; cell state is kernel-owned.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the current generation.
    fn render(&self, sim: &GridSimulation) -> Self::Output;
}

/// Text renderer for terminals, logs and tests.
///
/// Draws the grid with the highest row first so that `+z` points up.
#[derive(Debug, Clone)]
pub struct DebugTextRenderer {
    pub alive_glyph: char,
    pub dead_glyph: char,
    /// Print the generation/population header line.
    pub header: bool,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self {
            alive_glyph: '#',
            dead_glyph: '.',
            header: true,
        }
    }
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer that only prints cells.
    pub fn bare() -> Self {
        Self {
            header: false,
            ..Self::default()
        }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, sim: &GridSimulation) -> String {
        let (columns, rows) = sim.dimensions();
        let mut out = String::with_capacity((columns + 1) * rows + 64);
        if self.header {
            out.push_str(&format!(
                "=== generation {} | population {} | {}x{} ===\n",
                sim.generation(),
                sim.population(),
                columns,
                rows
            ));
        }
        for z in (0..rows).rev() {
            for x in 0..columns {
                let alive = sim.is_alive(x * rows + z);
                out.push(if alive {
                    self.alive_glyph
                } else {
                    self.dead_glyph
                });
            }
            out.push('\n');
        }
        out
    }
}
