use std::io::{self, Write};

use sweep_core::{GameSession, MinefieldGenerator};

/// Text rendering of the board, row `y = 0` on top, plus a status line.
pub fn render<G: MinefieldGenerator>(session: &GameSession<G>) -> String {
    let grid = session.grid();
    let mut lines = vec![format!(
        "{}x{}  mines left: {}",
        grid.width(),
        grid.height(),
        grid.mines_left()
    )];

    for y in 0..grid.height() {
        let row: Vec<String> = (0..grid.width())
            .filter_map(|x| grid.view((x, y)))
            .map(|view| view.glyph().to_string())
            .collect();
        lines.push(row.join(" "));
    }
    if let Some(message) = session.status().message() {
        lines.push(format!("{message} Type n for a new game."));
    }

    // trailing newline
    lines.push(String::new());
    lines.join("\n")
}

pub fn draw<G: MinefieldGenerator>(out: &mut impl Write, session: &GameSession<G>) -> io::Result<()> {
    out.write_all(render(session).as_bytes())?;
    out.flush()
}
