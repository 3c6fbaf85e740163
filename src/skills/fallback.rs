// Fallback phrasebook (spec.md §6.3), ported verbatim from
// `karen/skillmanager.py`'s `audioFallback` closure: a small set of
// hard-coded trigger phrases, first match wins, case-sensitive substring
// matching exactly as the original.

/// Returns the canned reply for the first matching trigger, or `None` if
/// nothing matches (caller should respond `{error:true, message:"Intent
/// not understood."}`).
pub fn fallback_reply(text: &str) -> Option<&'static str> {
    if text.contains("thanks") || text.contains("thank you") {
        Some("You're welcome.")
    } else if text.contains("who are you") || text.contains("who are u") {
        Some("I am a synthetic human. You may call me Karen.")
    } else if text.contains("how are you") {
        Some("I am online and functioning properly.")
    } else if text.contains("you real") && text.len() <= 15 {
        Some("What is real? If you define real as electrical impulses flowing through your brain then yes, I am real.")
    } else if text.contains("you human") && text.len() <= 17 {
        Some("More or less. My maker says that I am a synthetic human.")
    } else if text.contains("is your maker") && text.len() <= 20 {
        Some("I was designed by lnx user one in 2020 during the Covid 19 lockdown.")
    } else {
        None
    }
}
