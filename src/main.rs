mod attack;
mod cipher;
mod memo;
mod options;
mod pairs;
mod utility;

use structopt::StructOpt;

use crate::attack::Characteristic;
use crate::options::FealcrackOptions;

fn main() {
    match FealcrackOptions::from_args() {
        FealcrackOptions::Attack {
            pairs,
            input_diff,
            output_diff,
            output,
        } => {
            let characteristic = Characteristic {
                input_diff,
                output_diff,
            };

            attack::run_attack(pairs, &characteristic, output);
        }
        FealcrackOptions::Generate {
            key,
            pairs,
            input_diff,
            output,
        } => {
            pairs::run_generate(key, pairs, input_diff, output);
        }
    }
}
