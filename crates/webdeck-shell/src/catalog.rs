use webdeck_core::registry::GameRegistry;

/// The built-in game catalog, in display order.
pub fn builtin_catalog() -> GameRegistry {
    let mut games = Vec::new();
    #[cfg(feature = "game-2048")]
    games.push(webdeck_2048::descriptor());
    #[cfg(feature = "hextris")]
    games.push(webdeck_hextris::descriptor());
    #[cfg(feature = "hexgl")]
    games.push(webdeck_hexgl::descriptor());
    GameRegistry::new(games)
}
